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

use crate::Credential;
use async_trait::async_trait;
use streamone_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider provides a fixed StreamOne credential.
///
/// Use it when the application (or user) id and its pre-shared key are known
/// up front.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Authenticate as the given application.
    pub fn application(application: &str, psk: &str) -> Self {
        Self {
            credential: Credential::application(application, psk),
        }
    }

    /// Authenticate as the given user.
    pub fn user(user: &str, psk: &str) -> Self {
        Self {
            credential: Credential::user(user, psk),
        }
    }

    /// Act on behalf of a customer.
    pub fn with_customer(mut self, customer: &str) -> Self {
        self.credential = self.credential.with_customer(customer);
        self
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
