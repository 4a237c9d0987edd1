pub mod balance;
pub mod conflict;
pub mod lifecycle;
pub mod locks;

pub use balance::{AllowancePolicy, BalanceCalculator, FlatAllowance, LeaveBalance};
pub use conflict::has_conflict;
pub use lifecycle::LeaveService;
