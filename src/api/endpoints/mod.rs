pub mod alerts;
pub mod caregivers;
pub mod checks;
pub mod doses;
pub mod health;
