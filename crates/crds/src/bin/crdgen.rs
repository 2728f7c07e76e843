//! Prints the App CustomResourceDefinition as YAML.
//!
//! Usage: `cargo run -p crds --bin crdgen > config/crd/apps.demo.candy-box.top.yaml`

use crds::App;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crd = serde_yaml::to_string(&App::crd())?;
    print!("{crd}");
    Ok(())
}
