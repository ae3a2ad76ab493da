//! Request-scoped identity types.

use serde::Serialize;

use carebase_core::{HospitalId, Staff, StaffId};

/// The authenticated staff member, attached to request extensions by the
/// auth gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffContext {
    pub staff_id: StaffId,
    pub hospital_id: HospitalId,
    pub username: String,
}

impl From<&Staff> for StaffContext {
    fn from(staff: &Staff) -> Self {
        Self {
            staff_id: staff.id,
            hospital_id: staff.hospital_id,
            username: staff.username.clone(),
        }
    }
}
