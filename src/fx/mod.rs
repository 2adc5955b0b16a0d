pub mod fade;
pub mod rain;
pub mod typewriter;
