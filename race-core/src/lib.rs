//! Simulation for a top-down sprite racer: polar velocity, car kinematics,
//! bitmap-mask collision, checkpoints and the follow camera. Nothing in here
//! knows about windows or rendering; the `racing` crate drives a [`Session`]
//! once per tick and draws its [`session::DrawItem`]s.

pub mod camera;
pub mod car;
pub mod checkpoint;
pub mod collision;
pub mod error;
pub mod mask;
pub mod session;
pub mod track_format;
pub mod vector;

pub use session::Session;
