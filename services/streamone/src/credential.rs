// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use streamone_core::{utils::Redact, Error, SigningCredential};

use crate::constants::{PARAM_APPLICATION, PARAM_USER};

/// How a request authenticates against the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AuthenticationType {
    /// Authenticate as an application with its pre-shared key.
    #[default]
    Application,
    /// Authenticate as a user with its pre-shared key.
    User,
}

impl AuthenticationType {
    /// Value of the `authentication_type` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationType::Application => "application",
            AuthenticationType::User => "user",
        }
    }

    /// Name of the parameter that carries the acting identity.
    pub fn actor_parameter(&self) -> &'static str {
        match self {
            AuthenticationType::Application => PARAM_APPLICATION,
            AuthenticationType::User => PARAM_USER,
        }
    }
}

impl Display for AuthenticationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "application" => Ok(AuthenticationType::Application),
            "user" => Ok(AuthenticationType::User),
            v => Err(Error::config_invalid(format!(
                "unknown authentication type {v:?}, expected application or user"
            ))),
        }
    }
}

/// Credential for the StreamOne API.
///
/// A session, once created, is not part of the credential. It is carried by
/// the [`crate::RequestSigner`] instead, see [`crate::SessionToken`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// How requests authenticate.
    pub authentication_type: AuthenticationType,
    /// Application id or user id, depending on `authentication_type`.
    pub actor_id: String,
    /// Pre-shared key of the actor.
    pub psk: String,
    /// Customer to act on behalf of.
    pub customer: Option<String>,
}

impl Credential {
    /// Create a credential that authenticates as an application.
    pub fn application(application: impl Into<String>, psk: impl Into<String>) -> Self {
        Self {
            authentication_type: AuthenticationType::Application,
            actor_id: application.into(),
            psk: psk.into(),
            customer: None,
        }
    }

    /// Create a credential that authenticates as a user.
    pub fn user(user: impl Into<String>, psk: impl Into<String>) -> Self {
        Self {
            authentication_type: AuthenticationType::User,
            actor_id: user.into(),
            psk: psk.into(),
            customer: None,
        }
    }

    /// Act on behalf of the given customer.
    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("authentication_type", &self.authentication_type)
            .field("actor_id", &self.actor_id)
            .field("psk", &Redact::from(&self.psk))
            .field("customer", &self.customer)
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.actor_id.is_empty() && !self.psk.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("application", AuthenticationType::Application; "application")]
    #[test_case("user", AuthenticationType::User; "user")]
    fn test_parse_authentication_type(input: &str, expected: AuthenticationType) {
        let parsed: AuthenticationType = input.parse().expect("must parse");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), input);
    }

    #[test]
    fn test_parse_unknown_authentication_type() {
        let err = "customer"
            .parse::<AuthenticationType>()
            .expect_err("must fail");
        assert_eq!(err.kind(), streamone_core::ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_debug_redacts_psk() {
        let cred = Credential::application("APPLICATION", "AAAAABBBBBCCCCCDDDDD000000111111222222");
        let s = format!("{cred:?}");

        assert!(s.contains("AAA***222"));
        assert!(!s.contains("BBBBB"));
    }

    #[test]
    fn test_is_valid() {
        assert!(Credential::user("user", "psk").is_valid());
        assert!(!Credential::user("", "psk").is_valid());
        assert!(!Credential::application("APPLICATION", "").is_valid());
    }
}
