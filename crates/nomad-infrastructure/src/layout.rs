//! Where each document lives in the store.
//!
//! ```text
//! users/{uid}                      profile
//! users/{uid}/chats/{sessionId}    chat session
//! users/{uid}/favorites/saved      favorite set
//! ```

use nomad_core::store::{CollectionPath, DocumentPath};

const USERS: &str = "users";
const CHATS: &str = "chats";
const FAVORITES: &str = "favorites";
const SAVED_FAVORITES: &str = "saved";

pub fn profile(uid: &str) -> DocumentPath {
    CollectionPath::root(USERS).doc(uid)
}

pub fn chats(uid: &str) -> CollectionPath {
    profile(uid).collection(CHATS)
}

pub fn chat(uid: &str, session_id: &str) -> DocumentPath {
    chats(uid).doc(session_id)
}

pub fn favorites(uid: &str) -> DocumentPath {
    profile(uid).collection(FAVORITES).doc(SAVED_FAVORITES)
}
