//! Which bitmaps make up a character frame, and in which order

use super::frames::{slot_info, FrameCategory, SlotInfo, CHARACTER_FRAME_COUNT};
use super::tables::{
    hat_mask, HatMask, ARMOR_FRAMES, ARMOR_OFFSETS, ARMOR_SET_SPAN, BOOTS_FRAMES, BOOTS_OFFSETS,
    BOOTS_SET_SPAN, HAIR_COLOR_SPAN, HAIR_OFFSETS, HAIR_STYLE_SPAN, HAT_BACK, HAT_FRONT,
    HAT_OFFSETS, HAT_SET_SPAN, SKIN_OFFSETS,
};
use super::{Appearance, Facing, Gender};
use crate::bitmap::{BitmapKey, BitmapStore, GfxCategory};
use crate::compositor::Layer;
use crate::error::Warning;
use crate::rect::Rect;

/// Role of a layer in a character frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerKind {
    HairBehind,
    Skin,
    Boots,
    Armor,
    Hat,
    Hair,
}

/// One layer to draw: the bitmap, the part of it to use, and its nudge
/// relative to the character anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    pub kind: LayerKind,
    pub key: BitmapKey,
    /// Cell inside a sheet; `None` draws the whole bitmap
    pub source: Option<Rect>,
    pub offset: (i32, i32),
}

/// Whether `slot` can never apply to a character.
///
/// Chair poses need a chair on the map; melee and ranged attacks are
/// exclusive, picked by the equipped weapon.
pub fn slot_excluded(slot: usize, has_chairs: bool, ranged: bool) -> bool {
    match slot_info(slot).map(|info| info.category) {
        Some(FrameCategory::Chair) => !has_chairs,
        Some(FrameCategory::Melee) => ranged,
        Some(FrameCategory::Ranged) => !ranged,
        Some(_) => false,
        None => true,
    }
}

/// Layers of `slot` in draw order.
///
/// Order: hair behind, skin, boots, armor, hat (face masks), hair, hat
/// (everything else). Hair layers are left out for bald characters and under
/// hats that hide hair. Equipment whose resource id does not fit is left out
/// too; see [`unaddressable_layers`].
pub fn layer_specs(appearance: &Appearance, slot: usize) -> Vec<LayerSpec> {
    collect_layers(appearance, slot, &mut Vec::new())
}

/// Equipment layers of `appearance` that are never drawn because their
/// resource id overflows.
pub fn unaddressable_layers(appearance: &Appearance) -> Vec<LayerKind> {
    let mut dropped = Vec::new();
    for slot in 0..CHARACTER_FRAME_COUNT {
        collect_layers(appearance, slot, &mut dropped);
    }
    dropped.sort();
    dropped.dedup();
    dropped
}

fn collect_layers(appearance: &Appearance, slot: usize, dropped: &mut Vec<LayerKind>) -> Vec<LayerSpec> {
    let Some(info) = slot_info(slot) else {
        return Vec::new();
    };
    let gender = appearance.gender;
    let g = gender.index();
    let eq = &appearance.equipment;
    let mask = hat_mask(eq.hat);
    let hair_drawn = mask != HatMask::HideHair && appearance.has_hair();

    let mut specs = Vec::with_capacity(7);

    if hair_drawn {
        specs.push(LayerSpec {
            kind: LayerKind::HairBehind,
            key: hair_key(appearance, info.facing, true),
            source: None,
            offset: HAIR_OFFSETS[g][slot],
        });
    }

    specs.push(LayerSpec {
        kind: LayerKind::Skin,
        key: BitmapKey::new(GfxCategory::SKIN, info.category.skin_sheet()),
        source: Some(skin_cell(appearance, &info)),
        offset: SKIN_OFFSETS[g][slot],
    });

    if eq.boots != 0 {
        match set_resource(eq.boots, BOOTS_SET_SPAN, BOOTS_FRAMES[slot]) {
            Some(id) => specs.push(LayerSpec {
                kind: LayerKind::Boots,
                key: BitmapKey::new(pick(gender, GfxCategory::FEMALE_BOOTS, GfxCategory::MALE_BOOTS), id),
                source: None,
                offset: BOOTS_OFFSETS[g][slot],
            }),
            None => dropped.push(LayerKind::Boots),
        }
    }

    if eq.armor != 0 {
        match set_resource(eq.armor, ARMOR_SET_SPAN, ARMOR_FRAMES[slot]) {
            Some(id) => specs.push(LayerSpec {
                kind: LayerKind::Armor,
                key: BitmapKey::new(pick(gender, GfxCategory::FEMALE_ARMOR, GfxCategory::MALE_ARMOR), id),
                source: None,
                offset: ARMOR_OFFSETS[g][slot],
            }),
            None => dropped.push(LayerKind::Armor),
        }
    }

    let hat_image = match info.facing {
        Facing::Front => HAT_FRONT,
        Facing::Back => HAT_BACK,
    };
    let hat = match eq.hat {
        0 => None,
        set => match set_resource(set, HAT_SET_SPAN, hat_image) {
            Some(id) => Some(LayerSpec {
                kind: LayerKind::Hat,
                key: BitmapKey::new(pick(gender, GfxCategory::FEMALE_HAT, GfxCategory::MALE_HAT), id),
                source: None,
                offset: HAT_OFFSETS[g][slot],
            }),
            None => {
                dropped.push(LayerKind::Hat);
                None
            }
        },
    };

    if mask == HatMask::FaceMask {
        specs.extend(hat);
    }

    if hair_drawn {
        specs.push(LayerSpec {
            kind: LayerKind::Hair,
            key: hair_key(appearance, info.facing, false),
            source: None,
            offset: HAIR_OFFSETS[g][slot],
        });
    }

    if mask != HatMask::FaceMask {
        specs.extend(hat);
    }

    specs
}

/// Distinct bitmaps needed to draw `slot`
pub fn required_bitmaps(appearance: &Appearance, slot: usize) -> Vec<BitmapKey> {
    layer_specs(appearance, slot).into_iter().map(|spec| spec.key).collect()
}

/// Pair layer specs with loaded bitmaps.
///
/// A missing optional layer is skipped with a warning. Without the skin there
/// is nothing to draw and an empty list is returned so the frame can be
/// retried later.
pub fn resolve_layers<'a>(
    specs: &[LayerSpec],
    store: &'a BitmapStore,
    warnings: &mut Vec<Warning>,
) -> Vec<Layer<'a>> {
    let mut layers = Vec::with_capacity(specs.len());

    for spec in specs {
        let image = match store.get(&spec.key) {
            Some(image) => image,
            None if spec.kind == LayerKind::Skin => return Vec::new(),
            None => {
                let message = format!("missing {:?} bitmap {}, layer skipped", spec.kind, spec.key);
                log::warn!("{}", message);
                warnings.push(Warning::new(message));
                continue;
            }
        };

        if let Some(source) = spec.source {
            let bounds = Rect::new(0, 0, image.width(), image.height());
            if !bounds.contains(&source) {
                let message = format!(
                    "{:?} cell {:?} lies outside bitmap {} ({}x{})",
                    spec.kind,
                    source,
                    spec.key,
                    image.width(),
                    image.height()
                );
                log::warn!("{}", message);
                warnings.push(Warning::new(message));
                if spec.kind == LayerKind::Skin {
                    return Vec::new();
                }
                continue;
            }
        }

        layers.push(Layer {
            image,
            source: spec.source,
            offset: spec.offset,
        });
    }

    layers
}

fn pick(gender: Gender, female: GfxCategory, male: GfxCategory) -> GfxCategory {
    match gender {
        Gender::Female => female,
        Gender::Male => male,
    }
}

/// Resource id of image `index` in the 1-based equipment set `set`
fn set_resource(set: u32, span: u32, index: u32) -> Option<u32> {
    set.checked_sub(1)?.checked_mul(span)?.checked_add(index)
}

fn hair_key(appearance: &Appearance, facing: Facing, behind: bool) -> BitmapKey {
    let base = (appearance.hair_style as u32 - 1) * HAIR_STYLE_SPAN
        + appearance.hair_color as u32 * HAIR_COLOR_SPAN;
    let index = facing.index() * 2 + if behind { 1 } else { 2 };
    BitmapKey::new(
        pick(appearance.gender, GfxCategory::FEMALE_HAIR, GfxCategory::MALE_HAIR),
        base + index,
    )
}

/// Cell of the skin sheet for this slot: columns run gender, facing, step;
/// rows are skin tones.
fn skin_cell(appearance: &Appearance, info: &SlotInfo) -> Rect {
    let (w, h) = info.category.skin_size();
    let steps = info.category.steps();
    let column = appearance.gender.index() as u32 * 2 * steps + info.facing.index() * steps + info.step;
    Rect::new(column * w, appearance.skin as u32 * h, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{slot_index, Equipment, CHARACTER_FRAME_COUNT};
    use image::RgbaImage;

    fn kinds(specs: &[LayerSpec]) -> Vec<LayerKind> {
        specs.iter().map(|s| s.kind).collect()
    }

    fn dressed(hat: u32) -> Appearance {
        Appearance {
            gender: Gender::Female,
            skin: 1,
            hair_style: 2,
            hair_color: 3,
            equipment: Equipment { armor: 4, boots: 5, hat, shield: 0, weapon: 0 },
        }
    }

    #[test]
    fn test_standard_hat_order() {
        let specs = layer_specs(&dressed(1), 0);
        assert_eq!(
            kinds(&specs),
            vec![
                LayerKind::HairBehind,
                LayerKind::Skin,
                LayerKind::Boots,
                LayerKind::Armor,
                LayerKind::Hair,
                LayerKind::Hat
            ]
        );
    }

    #[test]
    fn test_face_mask_goes_under_hair() {
        let specs = layer_specs(&dressed(8), 0);
        assert_eq!(
            kinds(&specs),
            vec![
                LayerKind::HairBehind,
                LayerKind::Skin,
                LayerKind::Boots,
                LayerKind::Armor,
                LayerKind::Hat,
                LayerKind::Hair
            ]
        );
    }

    #[test]
    fn test_hide_hair_drops_hair_layers() {
        let specs = layer_specs(&dressed(14), 1);
        assert_eq!(
            kinds(&specs),
            vec![LayerKind::Skin, LayerKind::Boots, LayerKind::Armor, LayerKind::Hat]
        );
    }

    #[test]
    fn test_naked_bald_is_skin_only() {
        let specs = layer_specs(&Appearance::default(), 0);
        assert_eq!(kinds(&specs), vec![LayerKind::Skin]);
        assert_eq!(specs[0].key, BitmapKey::new(GfxCategory::SKIN, 1));
        assert_eq!(specs[0].source, Some(Rect::new(0, 0, 18, 58)));
    }

    #[test]
    fn test_resource_ids() {
        let mut a = dressed(3);
        a.gender = Gender::Male;
        let walk_back_2 = slot_index(FrameCategory::Walking, Facing::Back, 1).unwrap();
        let specs = layer_specs(&a, walk_back_2);

        let key = |kind| specs.iter().find(|s| s.kind == kind).unwrap().key;
        // hair style 2, colour 3, back facing
        assert_eq!(key(LayerKind::HairBehind), BitmapKey::new(GfxCategory::MALE_HAIR, 40 + 12 + 3));
        assert_eq!(key(LayerKind::Hair), BitmapKey::new(GfxCategory::MALE_HAIR, 40 + 12 + 4));
        assert_eq!(key(LayerKind::Boots), BitmapKey::new(GfxCategory::MALE_BOOTS, 4 * 40 + 8));
        assert_eq!(key(LayerKind::Armor), BitmapKey::new(GfxCategory::MALE_ARMOR, 3 * 50 + 8));
        assert_eq!(key(LayerKind::Hat), BitmapKey::new(GfxCategory::MALE_HAT, 2 * 10 + 3));
        assert_eq!(key(LayerKind::Skin), BitmapKey::new(GfxCategory::SKIN, 2));
        // male block starts after 8 female walking columns
        assert_eq!(
            specs.iter().find(|s| s.kind == LayerKind::Skin).unwrap().source,
            Some(Rect::new((8 + 4 + 1) * 26, 61, 26, 61))
        );
    }

    #[test]
    fn test_exclusions() {
        let chair = slot_index(FrameCategory::Chair, Facing::Front, 0).unwrap();
        let melee = slot_index(FrameCategory::Melee, Facing::Front, 0).unwrap();
        let ranged = slot_index(FrameCategory::Ranged, Facing::Back, 0).unwrap();

        assert!(slot_excluded(chair, false, false));
        assert!(!slot_excluded(chair, true, false));
        assert!(slot_excluded(melee, true, true));
        assert!(!slot_excluded(ranged, true, true));
        assert!(!slot_excluded(melee, true, false));
        assert!(slot_excluded(ranged, true, false));
        assert!(!slot_excluded(0, false, false));
        assert!(slot_excluded(CHARACTER_FRAME_COUNT, true, false));
    }

    #[test]
    fn test_resolve_skips_missing_optional_layers() {
        let a = dressed(1);
        let specs = layer_specs(&a, 0);
        let mut store = BitmapStore::new();
        store.insert(BitmapKey::new(GfxCategory::SKIN, 1), RgbaImage::new(18 * 4, 58 * 7));

        let mut warnings = Vec::new();
        let layers = resolve_layers(&specs, &store, &mut warnings);
        assert_eq!(layers.len(), 1);
        assert_eq!(warnings.len(), specs.len() - 1);
    }

    #[test]
    fn test_resolve_without_skin_is_empty() {
        let a = dressed(1);
        let specs = layer_specs(&a, 0);
        let mut store = BitmapStore::new();
        for spec in &specs {
            if spec.kind != LayerKind::Skin {
                store.insert(spec.key, RgbaImage::new(4, 4));
            }
        }
        let mut warnings = Vec::new();
        assert!(resolve_layers(&specs, &store, &mut warnings).is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_resolve_rejects_skin_cell_outside_sheet() {
        let specs = layer_specs(&Appearance { skin: 6, ..Default::default() }, 0);
        let mut store = BitmapStore::new();
        store.insert(BitmapKey::new(GfxCategory::SKIN, 1), RgbaImage::new(18 * 4, 58));
        let mut warnings = Vec::new();
        assert!(resolve_layers(&specs, &store, &mut warnings).is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_overflowing_equipment_is_left_out() {
        let mut a = dressed(1);
        a.equipment.armor = 100_000_000;
        a.equipment.hat = u32::MAX;

        for slot in 0..CHARACTER_FRAME_COUNT {
            let kinds = kinds(&layer_specs(&a, slot));
            assert!(!kinds.contains(&LayerKind::Armor));
            assert!(!kinds.contains(&LayerKind::Hat));
            assert!(kinds.contains(&LayerKind::Boots));
        }
        assert_eq!(unaddressable_layers(&a), vec![LayerKind::Armor, LayerKind::Hat]);
        assert!(unaddressable_layers(&dressed(1)).is_empty());
    }
}
