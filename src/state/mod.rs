/// Session state module
///
/// This module handles all storefront state, including:
/// - Shared data structures (data.rs)
/// - The seed catalog and image overrides (catalog.rs, overrides.rs)
/// - Category/search filtering (filter.rs)
/// - The cart ledger (cart.rs)
/// - AI image edit sessions (editor.rs)
/// - Toast notifications (toast.rs)
/// - The session object tying them together (session.rs)
pub mod cart;
pub mod catalog;
pub mod data;
pub mod editor;
pub mod filter;
pub mod overrides;
pub mod session;
pub mod toast;
