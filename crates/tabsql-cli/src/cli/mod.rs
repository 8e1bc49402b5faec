pub mod command_handlers;
pub mod dispatcher;
pub mod interactive_display;
pub mod main_types;
pub mod shell;
