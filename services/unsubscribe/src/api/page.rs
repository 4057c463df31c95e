//! Unsubscribe confirmation page.
//!
//! # Purpose and responsibility
//! Renders the HTML page linked from marketing mail. The page shows the
//! recipient's masked address and posts to `/api/unsubscribe` when the
//! recipient confirms.
//!
//! # Security considerations
//! - Query parameters are HTML-escaped before interpolation.
//! - The email reaches the inline script as a JSON string literal with `<`,
//!   `>` and `&` escaped, so it cannot close the script element.
use crate::api::types::UnsubscribePageQuery;
use axum::extract::Query;
use axum::response::Html;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Re:365 광고성 정보 메일 수신 거절 신청</title>
  <style>
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Malgun Gothic', sans-serif;
      background: #f5f5f5;
      min-height: 100vh;
      display: flex;
      align-items: center;
      justify-content: center;
      padding: 20px;
    }
    .container {
      background: white;
      border-radius: 8px;
      box-shadow: 0 2px 10px rgba(0,0,0,0.1);
      max-width: 450px;
      width: 100%;
      overflow: hidden;
    }
    .header {
      background: #f8f9fa;
      padding: 20px;
      border-bottom: 1px solid #e9ecef;
    }
    .header h1 { font-size: 16px; font-weight: 600; color: #333; }
    .content { padding: 30px 20px; text-align: center; }
    .name { color: #333; margin-bottom: 15px; }
    .question { font-size: 15px; color: #333; margin-bottom: 10px; }
    .email { font-size: 14px; color: #666; margin-bottom: 25px; }
    .buttons { display: flex; gap: 10px; justify-content: center; }
    .btn {
      padding: 12px 40px;
      border: none;
      border-radius: 4px;
      font-size: 14px;
      font-weight: 500;
      cursor: pointer;
      transition: all 0.2s;
    }
    .btn-primary { background: #ec4899; color: white; }
    .btn-primary:hover { background: #db2777; }
    .notice {
      padding: 15px 20px;
      background: #f9fafb;
      border-top: 1px solid #e9ecef;
      font-size: 12px;
      color: #666;
      line-height: 1.5;
    }
    .result { display: none; padding: 30px 20px; text-align: center; }
    .result.show { display: block; }
    .result-icon { font-size: 48px; margin-bottom: 15px; }
    .result-message { font-size: 16px; color: #333; margin-bottom: 10px; }
    .result-sub { font-size: 14px; color: #666; }
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>Re:365 광고성 정보 메일 수신 거절 신청</h1>
    </div>
    <div class="content" id="confirmContent">
      <p class="name">"#;

const PAGE_AFTER_NAME: &str = r#"</p>
      <p class="question"><strong>Re:365 광고성 정보 메일</strong> 수신을 거절 하시겠습니까?</p>
      <p class="email">메일 주소 : <strong>"#;

const PAGE_AFTER_EMAIL: &str = r#"</strong></p>
      <div class="buttons">
        <button class="btn btn-primary" onclick="processUnsubscribe()">수신 거절</button>
      </div>
    </div>
    <div class="result" id="resultContent">
      <div class="result-icon" id="resultIcon">✅</div>
      <p class="result-message" id="resultMessage">수신거부 처리가 완료되었습니다.</p>
      <p class="result-sub" id="resultSub">더 이상 광고성 메일을 받지 않습니다.</p>
      <p style="margin-top: 20px; font-size: 13px; color: #9ca3af;">이 탭을 닫아주세요.</p>
    </div>
    <div class="notice">
      · 광고성 정보 메일 수신을 거절하시면, Re:365에서 제공하는 행사 및 할인 정보가 제공되지 않습니다.
    </div>
  </div>

  <script>
    function processUnsubscribe() {
      const email = "#;

const PAGE_TAIL: &str = r#";
      if (!email) {
        alert('이메일 정보가 없습니다.');
        return;
      }

      fetch('/api/unsubscribe', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ email: email })
      })
      .then(res => res.json())
      .then(data => {
        document.getElementById('confirmContent').style.display = 'none';
        document.getElementById('resultContent').classList.add('show');

        if (data.success) {
          document.getElementById('resultIcon').textContent = '✅';
          document.getElementById('resultMessage').textContent = '수신거부 처리가 완료되었습니다.';
          document.getElementById('resultSub').textContent = '더 이상 광고성 메일을 받지 않습니다.';
        } else {
          document.getElementById('resultIcon').textContent = 'ℹ️';
          document.getElementById('resultMessage').textContent = data.message || '처리 중 오류가 발생했습니다.';
          document.getElementById('resultSub').textContent = '';
        }
      })
      .catch(err => {
        alert('오류가 발생했습니다: ' + err.message);
      });
    }
  </script>
</body>
</html>
"#;

#[utoipa::path(
    get,
    path = "/unsubscribe",
    tag = "unsubscribe",
    params(UnsubscribePageQuery),
    responses(
        (status = 200, description = "Confirmation page", content_type = "text/html; charset=utf-8", body = String)
    )
)]
pub(crate) async fn unsubscribe_page(query: Option<Query<UnsubscribePageQuery>>) -> Html<String> {
    // An unparseable query string renders the page without personalization.
    let query = query.map(|Query(query)| query).unwrap_or_default();
    Html(render_unsubscribe_page(
        query.email.as_deref().unwrap_or_default(),
        query.name.as_deref().unwrap_or_default(),
    ))
}

/// Render the confirmation page for `email` and `name`; either may be empty.
pub fn render_unsubscribe_page(email: &str, name: &str) -> String {
    let name_line = if name.is_empty() {
        String::new()
    } else {
        format!("{}님", escape_html(name))
    };
    let masked = escape_html(&mask_email(email));
    let script_email = script_string_literal(email);

    let mut page = String::with_capacity(
        PAGE_HEAD.len() + PAGE_AFTER_NAME.len() + PAGE_AFTER_EMAIL.len() + PAGE_TAIL.len() + 256,
    );
    page.push_str(PAGE_HEAD);
    page.push_str(&name_line);
    page.push_str(PAGE_AFTER_NAME);
    page.push_str(&masked);
    page.push_str(PAGE_AFTER_EMAIL);
    page.push_str(&script_email);
    page.push_str(PAGE_TAIL);
    page
}

/// Keep the first two characters and the domain, hide the rest of the local
/// part: `test@example.com` becomes `te****@example.com`.
///
/// Addresses without `@`, or with fewer than two characters before the last
/// `@`, are returned unchanged.
pub fn mask_email(email: &str) -> String {
    let Some(at) = email.rfind('@') else {
        return email.to_string();
    };
    let local = &email[..at];
    let mut chars = local.char_indices();
    match (chars.next(), chars.next()) {
        (Some(_), Some((second, ch))) => {
            let keep = second + ch.len_utf8();
            format!("{}****{}", &local[..keep], &email[at..])
        }
        _ => email.to_string(),
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn script_string_literal(value: &str) -> String {
    // Serializing a &str cannot fail.
    let literal = serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string());
    literal
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
