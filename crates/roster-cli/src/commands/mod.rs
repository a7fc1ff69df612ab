pub mod dispatch;
pub mod query;
pub mod recruitment;
pub mod shared;
pub mod shipping;
