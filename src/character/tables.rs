//! Static layer data: per-slot offsets, per-slot image indices and hat masks
//!
//! Offsets are pixel nudges of a layer's centre relative to the character
//! anchor, indexed `[gender][slot]` (female first). Slot order:
//!
//! | slots  | pose                  |
//! |--------|-----------------------|
//! | 0-1    | standing front/back   |
//! | 2-9    | walking front 1-4, back 1-4 |
//! | 10-13  | melee front 1-2, back 1-2   |
//! | 14-15  | raised hand           |
//! | 16-17  | chair                 |
//! | 18-19  | floor                 |
//! | 20-21  | ranged                |
//!
//! **Placeholder data.** Every table in this module was authored for this
//! crate and is not the game client's shipped data. Frames line up with the
//! bundled fixtures but will be misaligned against real art until these
//! tables are replaced with the client's values.

use super::frames::CHARACTER_FRAME_COUNT;

type OffsetTable = [[(i32, i32); CHARACTER_FRAME_COUNT]; 2];

#[rustfmt::skip]
pub(crate) const SKIN_OFFSETS: OffsetTable = [
    [
        (0, 0), (0, 0),
        (0, -1), (0, -2), (0, -1), (0, 0),
        (0, -1), (0, -2), (0, -1), (0, 0),
        (1, -1), (3, -1), (-1, -1), (-3, -1),
        (0, -1), (0, -1),
        (1, 5), (-1, 5),
        (0, 12), (0, 12),
        (2, -1), (-2, -1),
    ],
    [
        (0, 0), (0, 0),
        (0, -1), (0, -2), (0, -1), (0, 0),
        (0, -1), (0, -2), (0, -1), (0, 0),
        (2, -1), (4, -1), (-2, -1), (-4, -1),
        (0, -1), (0, -1),
        (1, 4), (-1, 4),
        (0, 11), (0, 11),
        (2, -2), (-2, -2),
    ],
];

#[rustfmt::skip]
pub(crate) const HAIR_OFFSETS: OffsetTable = [
    [
        (-1, -22), (1, -22),
        (-1, -23), (-1, -24), (-1, -23), (-1, -22),
        (1, -23), (1, -24), (1, -23), (1, -22),
        (1, -22), (3, -21), (-1, -22), (-3, -21),
        (-1, -23), (1, -23),
        (0, -17), (0, -17),
        (-1, -11), (1, -11),
        (1, -22), (-1, -22),
    ],
    [
        (-1, -23), (1, -23),
        (-1, -24), (-1, -25), (-1, -24), (-1, -23),
        (1, -24), (1, -25), (1, -24), (1, -23),
        (2, -23), (4, -22), (-2, -23), (-4, -22),
        (-1, -24), (1, -24),
        (0, -18), (0, -18),
        (-1, -12), (1, -12),
        (1, -23), (-1, -23),
    ],
];

#[rustfmt::skip]
pub(crate) const BOOTS_OFFSETS: OffsetTable = [
    [
        (0, 25), (0, 25),
        (0, 24), (1, 23), (0, 24), (-1, 25),
        (0, 24), (-1, 23), (0, 24), (1, 25),
        (0, 25), (2, 25), (0, 25), (-2, 25),
        (0, 25), (0, 25),
        (3, 22), (-3, 22),
        (4, 17), (-4, 17),
        (0, 25), (0, 25),
    ],
    [
        (0, 26), (0, 26),
        (0, 25), (1, 24), (0, 25), (-1, 26),
        (0, 25), (-1, 24), (0, 25), (1, 26),
        (0, 26), (2, 26), (0, 26), (-2, 26),
        (0, 26), (0, 26),
        (3, 23), (-3, 23),
        (4, 18), (-4, 18),
        (0, 26), (0, 26),
    ],
];

#[rustfmt::skip]
pub(crate) const ARMOR_OFFSETS: OffsetTable = [
    [
        (0, 3), (0, 3),
        (0, 2), (0, 1), (0, 2), (0, 3),
        (0, 2), (0, 1), (0, 2), (0, 3),
        (1, 2), (3, 3), (-1, 2), (-3, 3),
        (0, 2), (0, 2),
        (1, 6), (-1, 6),
        (0, 11), (0, 11),
        (2, 2), (-2, 2),
    ],
    [
        (0, 2), (0, 2),
        (0, 1), (0, 0), (0, 1), (0, 2),
        (0, 1), (0, 0), (0, 1), (0, 2),
        (2, 1), (4, 2), (-2, 1), (-4, 2),
        (0, 1), (0, 1),
        (1, 5), (-1, 5),
        (0, 10), (0, 10),
        (2, 1), (-2, 1),
    ],
];

#[rustfmt::skip]
pub(crate) const HAT_OFFSETS: OffsetTable = [
    [
        (-1, -26), (1, -26),
        (-1, -27), (-1, -28), (-1, -27), (-1, -26),
        (1, -27), (1, -28), (1, -27), (1, -26),
        (1, -26), (3, -25), (-1, -26), (-3, -25),
        (-1, -27), (1, -27),
        (0, -21), (0, -21),
        (-1, -15), (1, -15),
        (1, -26), (-1, -26),
    ],
    [
        (-1, -27), (1, -27),
        (-1, -28), (-1, -29), (-1, -28), (-1, -27),
        (1, -28), (1, -29), (1, -28), (1, -27),
        (2, -27), (4, -26), (-2, -27), (-4, -26),
        (-1, -28), (1, -28),
        (0, -22), (0, -22),
        (-1, -16), (1, -16),
        (1, -27), (-1, -27),
    ],
];

/// Image index inside an armor set for each slot; a set spans 50 ids.
#[rustfmt::skip]
pub(crate) const ARMOR_FRAMES: [u32; CHARACTER_FRAME_COUNT] = [
    1, 2,
    3, 4, 5, 6, 7, 8, 9, 10,
    11, 12, 13, 14,
    15, 16,
    17, 18,
    19, 20,
    21, 22,
];
pub(crate) const ARMOR_SET_SPAN: u32 = 50;

/// Boots share the standing images for attacks; a set spans 40 ids.
#[rustfmt::skip]
pub(crate) const BOOTS_FRAMES: [u32; CHARACTER_FRAME_COUNT] = [
    1, 2,
    3, 4, 5, 6, 7, 8, 9, 10,
    1, 1, 2, 2,
    1, 2,
    11, 12,
    13, 14,
    1, 2,
];
pub(crate) const BOOTS_SET_SPAN: u32 = 40;

/// Hats only change with facing; a set spans 10 ids.
pub(crate) const HAT_FRONT: u32 = 1;
pub(crate) const HAT_BACK: u32 = 3;
pub(crate) const HAT_SET_SPAN: u32 = 10;

/// Hair blocks: 40 ids per style, 4 per colour (behind/front for each facing).
pub(crate) const HAIR_STYLE_SPAN: u32 = 40;
pub(crate) const HAIR_COLOR_SPAN: u32 = 4;

/// How a hat interacts with hair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HatMask {
    /// Hair drawn, hat over it
    #[default]
    Standard,
    /// Hair drawn over the hat (masks, veils)
    FaceMask,
    /// Hair hidden entirely (helmets, hoods)
    HideHair,
}

/// Hats that are not `Standard`, sorted by graphic id.
#[rustfmt::skip]
const HAT_MASKS: &[(u32, HatMask)] = &[
    (7, HatMask::FaceMask),
    (8, HatMask::FaceMask),
    (9, HatMask::FaceMask),
    (10, HatMask::FaceMask),
    (11, HatMask::HideHair),
    (12, HatMask::HideHair),
    (13, HatMask::HideHair),
    (14, HatMask::HideHair),
    (15, HatMask::HideHair),
    (16, HatMask::HideHair),
    (19, HatMask::HideHair),
    (20, HatMask::HideHair),
    (21, HatMask::HideHair),
    (25, HatMask::HideHair),
    (26, HatMask::HideHair),
    (28, HatMask::HideHair),
    (30, HatMask::HideHair),
    (31, HatMask::HideHair),
    (32, HatMask::FaceMask),
    (33, HatMask::FaceMask),
    (40, HatMask::HideHair),
    (41, HatMask::HideHair),
    (46, HatMask::HideHair),
    (47, HatMask::HideHair),
    (48, HatMask::FaceMask),
    (50, HatMask::HideHair),
];

/// Mask type of hat graphic `hat` (`Standard` for no hat)
pub fn hat_mask(hat: u32) -> HatMask {
    HAT_MASKS
        .binary_search_by_key(&hat, |&(id, _)| id)
        .map(|i| HAT_MASKS[i].1)
        .unwrap_or_default()
}
