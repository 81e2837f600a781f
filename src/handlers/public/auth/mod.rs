// handlers/public/auth/mod.rs - OAuth login flow
//
// GET  /api/auth/signin    - redirect to the identity provider (PKCE S256)
// GET  /api/auth/callback  - verify state, identify the user, issue the session cookie
// POST /api/auth/signout   - clear the session cookie

pub mod callback;
pub mod signin;
pub mod signout;
pub mod utils;

pub use callback::get as callback_get;
pub use signin::get as signin_get;
pub use signout::post as signout_post;
