pub mod rest;
pub mod ws;

pub use rest::{
    advance_phase_handler, create_game_handler, game_summary_handler, get_game_handler,
    join_game_handler, pause_game_handler, process_day_handler, process_night_handler,
    resume_game_handler, start_game_handler,
};
pub use ws::websocket_handler;
