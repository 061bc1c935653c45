//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements     | Connects to             |
//! |----------------|----------------|-------------------------|
//! | `file_store`   | ScheduleStore  | Text record on disk     |
//! | `memory_store` | ScheduleStore  | In-memory (simulation)  |
//! | `log_sink`     | EventSink      | `log` facade            |
//! | `time`         | Clock          | Host local time         |

pub mod file_store;
pub mod log_sink;
pub mod memory_store;
pub mod time;
