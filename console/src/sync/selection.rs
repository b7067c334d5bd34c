//! Selection reconciliation across device refreshes

use maa_models::Device;

/// Pick the selection that should follow a device refresh.
///
/// A previous selection survives as long as its `device_id` is still in the
/// refreshed set. Otherwise the first device wins, or nothing when the set is
/// empty.
pub fn reconcile_selection(previous: Option<&str>, devices: &[Device]) -> Option<String> {
    if let Some(previous) = previous {
        if devices.iter().any(|d| d.device_id == previous) {
            return Some(previous.to_string());
        }
    }
    devices.first().map(|d| d.device_id.clone())
}
