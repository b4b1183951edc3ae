//! Wire protocol shared by the relay server and its clients.

pub mod protocol;
