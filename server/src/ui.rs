//! Embedded single-page UI for trying out the parse endpoint.

pub const UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Logistics AI Assistant</title>
<style>
  body { font-family: sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; }
  h1 { text-align: center; }
  textarea { width: 100%; height: 5rem; font-size: 1rem; padding: 0.5rem; box-sizing: border-box; }
  button { margin-top: 0.5rem; padding: 0.6rem 2rem; font-size: 1rem; cursor: pointer; }
  .intent { font-size: 1.3rem; font-weight: bold; margin: 1rem 0 0.2rem; }
  .confidence { color: #555; margin-bottom: 1rem; }
  .action { background: #eef4ff; border: 1px solid #bcd0f5; border-radius: 6px; padding: 0.8rem; margin-top: 1rem; }
  table { border-collapse: collapse; width: 100%; }
  td { border-bottom: 1px solid #ddd; padding: 0.4rem; }
  td.missing { color: #999; font-style: italic; }
  pre { background: #f6f6f6; padding: 0.8rem; overflow-x: auto; }
  .error { color: #b00; margin-top: 1rem; }
</style>
</head>
<body>
<h1>Logistics AI Assistant</h1>
<textarea id="query" placeholder="Example: Bhai pickup karna hai Andheri se Powai, 2 boxes hai"></textarea>
<button onclick="processQuery()">Process Query</button>
<div id="results"></div>
<script>
async function processQuery() {
  const query = document.getElementById('query').value.trim();
  const results = document.getElementById('results');
  if (!query) {
    results.innerHTML = '<p class="error">Please enter a query</p>';
    return;
  }
  try {
    const response = await fetch('/voice-agent/parse', {
      method: 'POST',
      headers: {'Content-Type': 'application/json'},
      body: JSON.stringify({text: query})
    });
    const data = await response.json();
    if (!response.ok) {
      results.innerHTML = '<p class="error">' + (data.message || 'Request failed') + '</p>';
      return;
    }
    let html = '<div class="intent">' + data.intent.intent + '</div>';
    html += '<div class="confidence">confidence: ' + data.intent.confidence + '</div>';
    html += '<table>';
    for (const [key, value] of Object.entries(data.entities)) {
      const display = (value === null || value === false) ? 'Not provided' : value;
      const cls = (value === null || value === false) ? ' class="missing"' : '';
      html += '<tr><td>' + key + '</td><td' + cls + '>' + display + '</td></tr>';
    }
    html += '</table>';
    if (data.next_action.message) {
      html += '<div class="action"><strong>Next step:</strong> ' + data.next_action.message + '</div>';
    }
    html += '<pre>' + JSON.stringify(data, null, 2) + '</pre>';
    results.innerHTML = html;
  } catch (err) {
    results.innerHTML = '<p class="error">' + err + '</p>';
  }
}
</script>
</body>
</html>
"#;
