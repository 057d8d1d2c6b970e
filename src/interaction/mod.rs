// Pointer interaction: drag state machine and its supporting pieces

pub mod drag;
pub mod grab_offset;
pub mod timers;
