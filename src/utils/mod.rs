pub mod detect;
pub mod parsing;

// Re-export commonly used items
pub use detect::SystemIdentity;
