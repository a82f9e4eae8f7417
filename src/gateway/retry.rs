/* This file is part of bundlr-contracts (https://bundlr.network)
 *
 * Copyright (C) 2022-2025 Bundlr Network
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use surf::{
    http::Method,
    middleware::{Middleware, Next},
    Body, Client, Request, Response,
};
use tracing::warn;

/// Default number of retries after the first attempt
pub const DEFAULT_RETRIES: u32 = 3;

/// Base delay multiplied by `2^attempt`
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Retries requests that failed in transit, and idempotent requests that
/// got a 5xx reply, sleeping exponentially longer between attempts.
#[derive(Clone, Debug)]
pub struct Backoff {
    retries: u32,
    base_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { retries: DEFAULT_RETRIES, base_delay: DEFAULT_BASE_DELAY }
    }
}

impl Backoff {
    pub fn new(retries: u32, base_delay: Duration) -> Self {
        Self { retries, base_delay }
    }

    /// Delay before the given 1-based retry: `2^attempt * base` plus up
    /// to 20% jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(2_u32.saturating_pow(attempt));
        let max_jitter = (exp.as_millis() / 5) as u64;
        let jitter = rand::thread_rng().gen_range(0..=max_jitter);
        exp + Duration::from_millis(jitter)
    }
}

fn is_idempotent(method: Method) -> bool {
    matches!(method, Method::Get | Method::Head | Method::Options | Method::Put | Method::Delete)
}

#[async_trait]
impl Middleware for Backoff {
    async fn handle(&self, mut req: Request, client: Client, next: Next<'_>) -> surf::Result<Response> {
        // Cloned requests lose their body, so keep it around for each attempt
        let body = req.take_body();
        let mime = body.mime().clone();
        let bytes = body.into_bytes().await?;
        let idempotent = is_idempotent(req.method());

        let mut attempt = 0;
        loop {
            let mut body = Body::from_bytes(bytes.clone());
            body.set_mime(mime.clone());
            let mut this = req.clone();
            this.set_body(body);

            let res = next.run(this, client.clone()).await;

            // A 5xx on a submission may still have been applied
            let reason = match &res {
                Ok(rep) if idempotent && rep.status().is_server_error() => rep.status().to_string(),
                Ok(_) => return res,
                Err(e) => e.to_string(),
            };

            if attempt >= self.retries {
                return res
            }

            attempt += 1;
            let delay = self.delay(attempt);
            warn!(
                target: "gateway::retry",
                "{} {} failed ({reason}), retry {attempt}/{} in {delay:?}",
                req.method(), req.url(), self.retries,
            );
            smol::Timer::after(delay).await;
        }
    }
}
