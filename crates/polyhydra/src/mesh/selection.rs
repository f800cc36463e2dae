use serde::{Deserialize, Serialize};

use super::{PolyMesh, Role};

/// Predicate choosing which faces an operator acts on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceSelection {
  #[default]
  All,
  None,
  ThreeSided,
  FourSided,
  FiveSided,
  SixSided,
  SevenPlusSided,
  OddSided,
  EvenSided,
  FacingUp,
  FacingDown,
  FacingLevel,
  Existing,
  New,
  NewAlt,
  AllNew,
  Ignored,
}

impl FaceSelection {
  pub const ALL: [FaceSelection; 17] = [
    FaceSelection::All,
    FaceSelection::None,
    FaceSelection::ThreeSided,
    FaceSelection::FourSided,
    FaceSelection::FiveSided,
    FaceSelection::SixSided,
    FaceSelection::SevenPlusSided,
    FaceSelection::OddSided,
    FaceSelection::EvenSided,
    FaceSelection::FacingUp,
    FaceSelection::FacingDown,
    FaceSelection::FacingLevel,
    FaceSelection::Existing,
    FaceSelection::New,
    FaceSelection::NewAlt,
    FaceSelection::AllNew,
    FaceSelection::Ignored,
  ];
}

/// Normal y-component beyond which a face counts as facing up or down.
const FACING_THRESHOLD: f32 = 0.5;

impl PolyMesh {
  pub fn include_face(&self, face: usize, selection: FaceSelection) -> bool {
    let role = self.face_role(face);
    match selection {
      FaceSelection::All => true,
      FaceSelection::None => false,
      FaceSelection::ThreeSided => self.sides(face) == 3,
      FaceSelection::FourSided => self.sides(face) == 4,
      FaceSelection::FiveSided => self.sides(face) == 5,
      FaceSelection::SixSided => self.sides(face) == 6,
      FaceSelection::SevenPlusSided => self.sides(face) >= 7,
      FaceSelection::OddSided => self.sides(face) % 2 == 1,
      FaceSelection::EvenSided => self.sides(face) % 2 == 0,
      FaceSelection::FacingUp => self.normal(face).y > FACING_THRESHOLD,
      FaceSelection::FacingDown => self.normal(face).y < -FACING_THRESHOLD,
      FaceSelection::FacingLevel => self.normal(face).y.abs() <= FACING_THRESHOLD,
      FaceSelection::Existing => role == Role::Existing,
      FaceSelection::New => role == Role::New,
      FaceSelection::NewAlt => role == Role::NewAlt,
      FaceSelection::AllNew => matches!(role, Role::New | Role::NewAlt),
      FaceSelection::Ignored => role == Role::Ignored,
    }
  }

  /// Number of faces matched by `selection`.
  pub fn count_selected(&self, selection: FaceSelection) -> usize {
    (0..self.face_count())
      .filter(|&f| self.include_face(f, selection))
      .count()
  }
}
