//! Configuration error page served when the API token is missing.

use crate::config::{PageConfig, SiteEnv};
use crate::inject::html::escape_html;

/// Literal marker identifying the missing value on the page.
pub const MISSING_TOKEN_MARKER: &str = "API_TOKEN: MISSING";

const STYLE: &str = r#"
    body {
      font-family: Arial, sans-serif;
      background: #dc3545;
      color: white;
      display: flex;
      align-items: center;
      justify-content: center;
      min-height: 100vh;
      margin: 0;
      text-align: center;
      padding: 20px;
    }
    .container { max-width: 600px; background: rgba(0,0,0,0.3); padding: 40px; border-radius: 15px; }
    h1 { margin-bottom: 20px; }
    .error-code { font-family: monospace; background: rgba(0,0,0,0.5); padding: 15px; border-radius: 5px; margin: 20px 0; }
    .steps { text-align: left; margin: 20px 0; }
    .steps li { margin: 10px 0; }
    a { color: #ffc107; }
    button { padding: 10px 20px; background: #ffc107; color: #333; border: none; border-radius: 5px; cursor: pointer; margin-top: 20px; }
"#;

/// Render the error page for `env`, which is expected to lack a token.
///
/// Only the non-secret values are displayed.
pub fn render(env: &SiteEnv, page: &PageConfig) -> String {
    let site = escape_html(&page.site_name);
    let owner = escape_html(&env.owner);
    let repo = escape_html(&env.repo);
    let email = escape_html(&page.support_email);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Configuration Error - {site}</title>
  <style>{STYLE}</style>
</head>
<body>
  <div class="container">
    <h1>Site configuration required</h1>
    <p>The API_TOKEN variable is not configured.</p>

    <div class="error-code">
      Detected variables:<br>
      &bull; REPO_OWNER: {owner}<br>
      &bull; REPO_NAME: {repo}<br>
      &bull; {MISSING_TOKEN_MARKER}
    </div>

    <h3>Configuration steps:</h3>
    <ol class="steps">
      <li>Open the <strong>hosting dashboard</strong></li>
      <li>Select the <strong>{site}</strong> site</li>
      <li>Go to <strong>Site settings &rarr; Environment variables</strong></li>
      <li>Add the variable:
        <ul>
          <li><code>API_TOKEN</code> = ghp_your_github_token</li>
        </ul>
      </li>
      <li>Redeploy the site</li>
    </ol>

    <p><strong>Support:</strong> <a href="mailto:{email}">{email}</a></p>
    <button onclick="location.reload()">Reload</button>
  </div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_shows_values_and_marker() {
        let env = SiteEnv {
            owner: "khalidbhb".into(),
            repo: "metatopo-data".into(),
            token: None,
        };
        let html = render(&env, &PageConfig::default());
        assert!(html.contains("<title>Configuration Error - METATOPO</title>"));
        assert!(html.contains("REPO_OWNER: khalidbhb"));
        assert!(html.contains("REPO_NAME: metatopo-data"));
        assert!(html.contains(MISSING_TOKEN_MARKER));
        assert!(html.contains("mailto:bouhabba.igt@gmail.com"));
    }

    #[test]
    fn test_page_escapes_values() {
        let env = SiteEnv {
            owner: "<img src=x>".into(),
            repo: "r&d".into(),
            token: None,
        };
        let html = render(&env, &PageConfig::default());
        assert!(html.contains("REPO_OWNER: &lt;img src=x&gt;"));
        assert!(html.contains("REPO_NAME: r&amp;d"));
        assert!(!html.contains("<img"));
    }
}
