//! Server-rendered HTML pages.
//!
//! The front end is deliberately small: one clock page and the pages around
//! the authorization flow. Every interpolated value goes through
//! [`html_escape`].

use timepunch_core::html_escape;

/// Shared page chrome.
fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
  body {{ font-family: sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }}
  .container {{ max-width: 1000px; margin: 0 auto; padding-top: 75px; }}
  .box {{ background-color: lightblue; padding: 15px; margin-bottom: 30px;
          word-break: break-all; }}
  button {{ font-size: 1.2em; padding: 12px 28px; margin-right: 10px; }}
  input {{ font-size: 1.1em; padding: 8px; }}
  #result {{ margin-top: 20px; white-space: pre-wrap; }}
</style>
</head>
<body>
<div class="container">
{body}
</div>
</body>
</html>
"#,
        title = html_escape(title),
        body = body,
    )
}

/// The clock front page: employee ID input plus in/out buttons.
///
/// The buttons capture the browser's geolocation and POST the clock request
/// as JSON; the backend's response text is shown as-is.
pub fn front_page() -> String {
    page(
        "timepunch",
        r#"<h2>Timesheet</h2>
<p><label>Employee ID: <input id="employee_id" type="text" autocomplete="off"></label></p>
<p>
  <button onclick="clockAction('in')">Clock in</button>
  <button onclick="clockAction('out')">Clock out</button>
</p>
<div id="result"></div>
<script>
function clockAction(action) {
  const result = document.getElementById("result");
  result.textContent = "...";
  navigator.geolocation.getCurrentPosition(async (position) => {
    const response = await fetch("/api/clock", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({
        action: action,
        employee_id: document.getElementById("employee_id").value,
        latitude: position.coords.latitude,
        longitude: position.coords.longitude,
      }),
    });
    result.textContent = await response.text();
  }, () => {
    result.textContent = "Location access is required to clock in or out.";
  });
}
</script>"#,
    )
}

/// The two-step auth page shown while no refresh token is stored.
pub fn auth_page(callback_url: &str, auth_url: &str) -> String {
    let body = format!(
        r#"<h2>Step 1: Callback URL</h2>
<p>Add this callback to the OAuth credential as an authorized redirect URI:</p>
<div class="box"><code>{callback}</code></div>
<h2>Step 2: Authorization URL</h2>
<p>After the redirect URI has propagated (a few minutes), visit this link to
authorize the application:</p>
<div class="box"><code><a href="{auth}">{auth}</a></code></div>"#,
        callback = html_escape(callback_url),
        auth = html_escape(auth_url),
    );
    page("Authorize timepunch", &body)
}

/// The auth page variant shown once a refresh token is stored.
pub fn already_authorized() -> String {
    page(
        "Authorized",
        "<h2>Already authorized</h2>\n<p>A refresh token is stored; nothing left to do.</p>",
    )
}

/// Rendered after a successful callback exchange.
pub fn callback_success() -> String {
    page(
        "Authorization complete",
        "<h1>Success!</h1>\n<p>The refresh token is stored and an access token is cached.\n\
         You can close this window.</p>",
    )
}

/// Rendered when the callback fails; the reason is escaped.
pub fn callback_error(reason: &str) -> String {
    let body = format!(
        "<h1>Authorization failed</h1>\n<p>{}</p>\n\
         <p>You can retry from the <a href=\"/auth\">auth page</a>.</p>",
        html_escape(reason)
    );
    page("Authorization failed", &body)
}
