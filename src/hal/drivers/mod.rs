pub mod proc_alsa;

pub use proc_alsa::ProcfsEnumerator;
