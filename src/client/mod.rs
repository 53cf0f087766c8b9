//! Client-side application logic, independent of any rendering layer.
//!
//! State lives in one explicitly passed [`AppState`] rather than ambient
//! globals; the cart and session expose the only mutation entry points.

pub mod cart;
pub mod page_state;
pub mod session;

use crate::models::Identity;
use cart::{Cart, CartStore};
use page_state::PageState;
use session::Session;

/// The whole client state: identity, cart, and listing page state.
pub struct AppState<S: CartStore> {
    pub session: Session,
    pub cart: Cart<S>,
    pub page: PageState,
}

impl<S: CartStore> AppState<S> {
    /// Fresh state with a guest cart.
    pub fn new(store: S, viewport_width: u32) -> Self {
        AppState {
            session: Session::default(),
            cart: Cart::load(store, None),
            page: PageState::new(viewport_width),
        }
    }

    /// Record a verified login and load that user's persisted cart.
    /// Never merges with whatever cart was loaded before.
    pub fn login(&mut self, token: String, user: Identity) {
        let email = user.email.clone();
        self.session.login(token, user);
        self.cart.switch_user(Some(&email));
    }

    /// Drop the session and leave an empty guest cart behind. The
    /// logged-out user's persisted cart record survives for their next
    /// login.
    pub fn logout(&mut self) {
        self.session.logout();
        self.cart.switch_user(None);
        self.cart.clear();
    }

    /// App-start restoration: the stored token was re-validated against
    /// the server; a verified identity restores the session and cart, a
    /// rejected one clears any stale session state.
    pub fn on_app_start(&mut self, verified: Option<(String, Identity)>) {
        match verified {
            Some((token, user)) => self.login(token, user),
            None => self.session.logout(),
        }
    }
}
