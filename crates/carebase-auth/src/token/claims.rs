//! Identity extraction from verified token payloads.
//!
//! Tokens reach the server in two encodings. The strict shape is the one
//! [`TokenCodec::issue`](super::TokenCodec::issue) writes: `staff_id` and
//! `hospital_id` as unsigned integers. The loose shape comes from generic
//! claim maps, where ids may be floats or numeric strings and keys may use
//! other spellings. [`resolve`] tries strict first, then loose.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use carebase_core::{HospitalId, StaffId};

/// Key spellings accepted for the staff id, in lookup order.
pub const STAFF_ID_KEYS: [&str; 4] = ["staff_id", "StaffID", "staffId", "staffID"];

/// Key spellings accepted for the hospital id, in lookup order.
pub const HOSPITAL_ID_KEYS: [&str; 4] = ["hospital_id", "HospitalID", "hospitalId", "hospitalID"];

/// Canonical caller identity carried by a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    pub staff_id: StaffId,
    pub hospital_id: HospitalId,
}

#[derive(Debug, Deserialize)]
struct StrictClaims {
    #[serde(default)]
    staff_id: StaffId,
    #[serde(default)]
    hospital_id: HospitalId,
}

fn strict_claims(payload: &Value) -> Option<StrictClaims> {
    StrictClaims::deserialize(payload).ok()
}

/// Reads the typed claim set. A zero or absent `staff_id` is a miss.
pub fn resolve_strict(payload: &Value) -> Option<Identity> {
    let claims = strict_claims(payload)?;
    if claims.staff_id == 0 {
        return None;
    }

    Some(Identity {
        staff_id: claims.staff_id,
        hospital_id: claims.hospital_id,
    })
}

/// Reads ids from a generic claim map.
///
/// The hospital id is `0` when no hospital key yields a usable value.
pub fn resolve_loose(payload: &Value) -> Option<Identity> {
    let staff_id = lookup(payload, &STAFF_ID_KEYS).filter(|id| *id != 0)?;
    let hospital_id = lookup(payload, &HOSPITAL_ID_KEYS).unwrap_or(0);

    Some(Identity {
        staff_id,
        hospital_id,
    })
}

/// Resolves the caller identity: strict shape first, then the loose one.
///
/// When the loose path finds no hospital id, a strictly typed `hospital_id`
/// is kept.
pub fn resolve(payload: &Value) -> Option<Identity> {
    if let Some(identity) = resolve_strict(payload) {
        return Some(identity);
    }

    let mut identity = resolve_loose(payload)?;
    if identity.hospital_id == 0 {
        identity.hospital_id = strict_claims(payload).map_or(0, |c| c.hospital_id);
    }
    Some(identity)
}

fn lookup(payload: &Value, keys: &[&str]) -> Option<u64> {
    let map = payload.as_object()?;
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(coerce_id)
}

fn coerce_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            let f = n.as_f64()?;
            (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64)
                .then_some(f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
