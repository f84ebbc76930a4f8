pub mod guard_steps;
pub mod lifecycle_steps;
pub mod membership_steps;
