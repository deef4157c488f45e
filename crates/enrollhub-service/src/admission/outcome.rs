//! Results of compound admission transitions.

use serde::{Deserialize, Serialize};

use enrollhub_entity::enrollment::Enrollment;
use enrollhub_entity::waitlist::WaitlistEntry;

/// A waitlisted student who took the seat freed by a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotedStudent {
    /// The new `ACTIVE` enrollment.
    pub enrollment: Enrollment,
    /// The consumed entry, now `ENROLLED`.
    pub entry: WaitlistEntry,
}

/// Everything a withdrawal changed.
///
/// A withdrawal may admit a second student; both effects are reported here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawOutcome {
    /// The enrollment moved to `WITHDRAWN`.
    pub withdrawn: Enrollment,
    /// The student promoted into the freed seat, if any.
    pub promoted: Option<PromotedStudent>,
}
