// App module for the pitwall dashboard
// Holds selector state and hands keyboard actions to the orchestrator

pub mod actions;
pub mod input;
pub mod state;


pub use input::handle_input;
pub use state::App;
