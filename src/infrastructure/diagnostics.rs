use std::time::Duration;

const PUBLIC_IP_URL: &str = "https://api.ipify.org";

/// Best-effort lookup of the host's public IP for error reports.
pub async fn public_ip() -> Option<String> {
    lookup(PUBLIC_IP_URL).await
}

async fn lookup(url: &str) -> Option<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .ok()?;

    let response = match client.get(url).send().await {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            tracing::warn!(status = response.status().as_u16(), "Public IP lookup failed");
            return None;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Public IP lookup failed");
            return None;
        }
    };

    let ip = response.text().await.ok()?.trim().to_string();
    (!ip.is_empty()).then_some(ip)
}
