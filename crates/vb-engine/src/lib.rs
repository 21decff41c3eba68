//! Engine interface and headless reference engine for vamiga-bridge

pub mod bus;
pub mod engine;
pub mod headless;
pub mod muxer;
pub mod rules;
pub mod store;

pub use bus::MessageBus;
pub use engine::{Engine, ExecState, MessageListener, DRIVE_COUNT};
pub use headless::HeadlessAmiga;
pub use muxer::Muxer;
pub use rules::{rule, Domain, OptionRule};
pub use store::OptionStore;
