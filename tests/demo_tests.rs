mod common;

use common::{init_logger, orchestrator_with, MockHost, TestResult};
use folio::{Document, ExportConfig, LopdfRasterizer, Media};
use std::path::Path;

fn demo(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

#[test]
fn demo_config_loads() -> TestResult {
    init_logger();
    let config = ExportConfig::from_file(demo("export.json"))?;
    let options = config.export_options()?;
    assert_eq!(options.filename(), "Alex_Morgan_Resume.pdf");
    assert_eq!(config.orchestrator_config().share_title, "Alex Morgan - Resume");
    Ok(())
}

#[tokio::test]
async fn demo_resume_exports_with_demo_config() -> TestResult {
    init_logger();
    let document = Document::from_file(demo("resume.json"))?;
    assert!(document.print_variant.is_some());
    assert!(document.styled_tree(Media::Print).style.background.as_srgb().is_some());

    let config = ExportConfig::from_file(demo("export.json"))?;
    let orch = orchestrator_with(
        document.clone(),
        MockHost::default(),
        LopdfRasterizer,
        config.export_options()?,
        common::fast_config(),
    );

    orch.download().await?;

    let (name, bytes) = orch.host().persisted().remove(0);
    assert_eq!(name, "Alex_Morgan_Resume.pdf");
    assert_valid_pdf!(bytes);
    // The legacy page-break marker forces Education onto a second page.
    assert_page_count!(bytes, 2);
    assert_eq!(orch.target().snapshot(), document);
    Ok(())
}
