pub mod caregiver;
pub mod dose;
pub mod enums;
pub mod medicine;
pub mod profile;

pub use caregiver::{CaregiverLink, LinkedParty};
pub use dose::{DoseLog, PendingDose};
pub use enums::*;
pub use medicine::Medicine;
pub use profile::Profile;
