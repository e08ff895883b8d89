// handlers/mod.rs - Two-tier handler layout
//
// Public handlers serve the docs, login and health endpoints. Protected
// handlers live under /dashboard and are only reached once the access gate
// has let the request through; they read the signed-in identity with the
// `CurrentIdentity` extractor.

pub mod protected;
pub mod public;
