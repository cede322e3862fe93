mod game_id;
mod ul_cfg;

pub use game_id::*;
pub use ul_cfg::*;
