//! Accessors generated by promc from `metrics.json` at build time.

include!(concat!(env!("OUT_DIR"), "/metrics.rs"));
