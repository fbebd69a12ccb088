//! The single page served at `/`.
//!
//! Everything dynamic is fetched as JSON and written with `textContent`, so
//! document text never passes through an HTML parser.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>文件转换器 Pro</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1100px; padding: 1.5rem; color: #222; }
  h1 { margin-bottom: 0.2rem; }
  .hidden { display: none; }
  .panel { border: 1px solid #ddd; border-radius: 6px; padding: 1rem; margin: 1rem 0; }
  .info { background: #eef5ff; padding: 0.6rem; border-radius: 4px; }
  .warning { background: #fff4e0; padding: 0.6rem; border-radius: 4px; }
  .success { background: #e8f8ec; padding: 0.6rem; border-radius: 4px; }
  textarea { width: 100%; font-family: ui-monospace, monospace; box-sizing: border-box; }
  progress { width: 100%; }
  button, .download { padding: 0.45rem 1rem; margin-top: 0.6rem; cursor: pointer; }
  .download { display: inline-block; border: 1px solid #888; border-radius: 4px; text-decoration: none; color: #222; }
  pre { white-space: pre-wrap; }
</style>
</head>
<body>
<h1>📚 文件转换器 Pro</h1>
<p>一个多功能文件转换工具，支持 EPUB、PDF 转 TXT</p>

<form id="form" class="panel">
  <label>上传你的 EPUB 或 PDF 文件
    <input type="file" id="file" name="file" accept=".epub,.pdf">
  </label>

  <div id="epub-options" class="hidden">
    <h2>EPUB 处理选项</h2>
    <button type="submit">将 EPUB 转换为 TXT</button>
  </div>

  <div id="pdf-options" class="hidden">
    <h2>PDF 处理选项</h2>
    <p>选择PDF处理模式:</p>
    <label><input type="radio" name="mode" value="text" checked> 提取文本 (适用于文本型PDF)</label><br>
    <label><input type="radio" name="mode" value="ocr"> OCR识别 (适用于扫描型PDF)</label>
    <div id="ocr-options" class="hidden">
      <p class="info">OCR过程可能需要一些时间，特别是对于多页文档。</p>
      <label><input type="checkbox" name="extra_text" value="on"> 同时输出一份纯文本提取的TXT文件 (作为对比或备用)</label>
    </div>
    <button type="submit" id="pdf-submit">开始提取文本</button>
  </div>

  <p id="unknown-type" class="warning hidden">上传的文件类型无法识别。请上传 .epub 或 .pdf 文件。</p>
</form>

<div id="busy" class="panel hidden">
  <p id="busy-label">正在处理…</p>
  <progress id="progress" max="1" value="0" class="hidden"></progress>
</div>

<p id="notice" class="warning hidden"></p>

<div id="result" class="hidden">
  <p class="success">处理完成！</p>
  <details id="toc-box" class="panel hidden">
    <summary>查看提取的目录</summary>
    <pre id="toc"></pre>
  </details>
  <h3>处理结果预览</h3>
  <textarea id="primary" rows="20" readonly aria-label="内容"></textarea>
  <a id="primary-download" class="download" href="/download/primary">下载主结果文件 (.txt)</a>

  <div id="secondary-box" class="hidden">
    <h3>额外的纯文本提取结果</h3>
    <textarea id="secondary" rows="10" readonly aria-label="内容 (纯文本提取)"></textarea>
    <a id="secondary-download" class="download" href="/download/secondary">下载纯文本提取文件 (.txt)</a>
  </div>
</div>

<script>
const $ = (id) => document.getElementById(id);
const show = (id, on) => $(id).classList.toggle("hidden", !on);

function mode() {
  const checked = document.querySelector('input[name="mode"]:checked');
  return checked ? checked.value : "text";
}

function refreshOptions() {
  const file = $("file").files[0];
  const name = file ? file.name : "";
  const isEpub = name.endsWith(".epub");
  const isPdf = name.endsWith(".pdf");
  show("epub-options", isEpub);
  show("pdf-options", isPdf);
  show("unknown-type", !!file && !isEpub && !isPdf);
  show("ocr-options", mode() === "ocr");
  $("pdf-submit").textContent = mode() === "ocr" ? "开始OCR识别" : "开始提取文本";
}

function render(view) {
  show("notice", !!view.notice);
  $("notice").textContent = view.notice || "";
  show("result", view.has_result);
  if (!view.has_result) return;
  show("toc-box", !!view.toc);
  $("toc").textContent = view.toc || "";
  $("primary").value = view.processed_text || "";
  $("primary-download").setAttribute("download", view.file_name || "result.txt");
  show("secondary-box", !!view.secondary_text);
  $("secondary").value = view.secondary_text || "";
  $("secondary-download").setAttribute("download", view.secondary_file_name || "extra_text.txt");
}

async function pollProgress() {
  try {
    const snap = await (await fetch("/api/progress")).json();
    $("progress").value = snap.fraction;
  } catch (_) { /* next tick retries */ }
}

$("file").addEventListener("change", refreshOptions);
document.querySelectorAll('input[name="mode"]').forEach((r) => r.addEventListener("change", refreshOptions));

$("form").addEventListener("submit", async (ev) => {
  ev.preventDefault();
  const file = $("file").files[0];
  if (!file) return;
  const ocr = file.name.endsWith(".pdf") && mode() === "ocr";
  const labels = { epub: "正在处理 EPUB 文件...", text: "正在提取PDF文本...", ocr: "正在进行OCR识别，请稍候..." };
  $("busy-label").textContent = file.name.endsWith(".epub") ? labels.epub : (ocr ? labels.ocr : labels.text);
  show("busy", true);
  show("progress", ocr);
  $("progress").value = 0;
  const timer = ocr ? setInterval(pollProgress, 500) : null;
  try {
    const resp = await fetch("/api/convert", { method: "POST", body: new FormData($("form")) });
    if (!resp.ok) {
      render({ has_result: false, notice: await resp.text() });
    } else {
      render(await resp.json());
    }
  } finally {
    if (timer) clearInterval(timer);
    show("busy", false);
  }
});

fetch("/api/state").then((r) => r.json()).then(render).catch(() => {});
refreshOptions();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_wires_the_api() {
        assert!(INDEX_HTML.contains("/api/convert"));
        assert!(INDEX_HTML.contains("/api/progress"));
        assert!(INDEX_HTML.contains("/download/primary"));
        assert!(INDEX_HTML.contains(r#"name="extra_text""#));
    }
}
