// State management module.
// Routing plus per-screen state for the landing and profile screens.

pub mod landing;
pub mod loading;
pub mod profile;
pub mod route;

pub use landing::LandingState;
pub use loading::LoadingState;
pub use profile::{ProfileData, ProfileState, ViewMode};
pub use route::Route;
