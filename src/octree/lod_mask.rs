//! Face directions and the per-leaf neighbor resolution mask.
//!
//! Bit order is fixed and shared with the transition meshers:
//!
//! ```text
//! bit 0: -X    bit 1: +X
//! bit 2: -Y    bit 3: +Y
//! bit 4: -Z    bit 5: +Z
//! ```

use glam::IVec3;

/// One of the six faces of a cubic node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
  NegX = 0,
  PosX = 1,
  NegY = 2,
  PosY = 3,
  NegZ = 4,
  PosZ = 5,
}

impl Face {
  /// All faces in bit order.
  pub const ALL: [Face; 6] = [
    Face::NegX,
    Face::PosX,
    Face::NegY,
    Face::PosY,
    Face::NegZ,
    Face::PosZ,
  ];

  /// Axis the face is perpendicular to (0 = X, 1 = Y, 2 = Z).
  #[inline]
  pub const fn axis(self) -> usize {
    self as usize >> 1
  }

  /// -1 for the negative face, +1 for the positive face.
  #[inline]
  pub const fn sign(self) -> i32 {
    if self as u8 & 1 == 0 {
      -1
    } else {
      1
    }
  }

  #[inline]
  pub const fn is_positive(self) -> bool {
    self as u8 & 1 == 1
  }

  #[inline]
  pub const fn opposite(self) -> Face {
    Face::ALL[self as usize ^ 1]
  }

  /// Outward unit normal.
  #[inline]
  pub fn normal(self) -> IVec3 {
    let mut normal = IVec3::ZERO;
    normal[self.axis()] = self.sign();
    normal
  }

  #[inline]
  pub const fn bit(self) -> u8 {
    1 << self as u8
  }
}

/// Set of faces across which a finer neighbor is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LodMask(u8);

impl LodMask {
  pub const EMPTY: LodMask = LodMask(0);
  pub const ALL: LodMask = LodMask(0b11_1111);

  /// Build from raw bits; bits above the sixth are ignored.
  #[inline]
  pub const fn from_bits(bits: u8) -> Self {
    Self(bits & Self::ALL.0)
  }

  #[inline]
  pub const fn bits(self) -> u8 {
    self.0
  }

  #[inline]
  pub const fn contains(self, face: Face) -> bool {
    self.0 & face.bit() != 0
  }

  #[inline]
  pub fn insert(&mut self, face: Face) {
    self.0 |= face.bit();
  }

  #[inline]
  pub fn remove(&mut self, face: Face) {
    self.0 &= !face.bit();
  }

  #[inline]
  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }

  /// Flagged faces in bit order.
  pub fn iter(self) -> impl Iterator<Item = Face> {
    Face::ALL.into_iter().filter(move |&face| self.contains(face))
  }
}

impl FromIterator<Face> for LodMask {
  fn from_iter<I: IntoIterator<Item = Face>>(iter: I) -> Self {
    let mut mask = LodMask::EMPTY;
    for face in iter {
      mask.insert(face);
    }
    mask
  }
}
