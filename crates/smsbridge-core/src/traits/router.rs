// SPDX-FileCopyrightText: 2026 Smsbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router client trait: the two calls a tick makes against the router's web UI.

use async_trait::async_trait;

use crate::error::SmsBridgeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Credentials, RawSmsEntry, SessionCookie};

/// Client for the router's management interface.
#[async_trait]
pub trait RouterClient: PluginAdapter {
    /// Logs in and returns the cookie header to use for the rest of the tick.
    ///
    /// Fails with [`SmsBridgeError::Auth`] when the router does not report
    /// success or sends no cookies, and with [`SmsBridgeError::Transport`] when
    /// the request itself fails.
    async fn login(&self, credentials: &Credentials) -> Result<SessionCookie, SmsBridgeError>;

    /// Fetches the current SMS inbox listing.
    ///
    /// A listing without the expected `smsList.phoneList` path is an empty
    /// list, not an error.
    async fn fetch_sms_list(
        &self,
        session: &SessionCookie,
    ) -> Result<Vec<RawSmsEntry>, SmsBridgeError>;
}
