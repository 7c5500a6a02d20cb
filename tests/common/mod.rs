//! Shared fixtures and helpers for the integration tests.
#![allow(dead_code)]

use easel::{FontLibrary, PassthroughCompiler, Pipeline};
use std::sync::Arc;

/// The end-to-end hello-world deck from the rendering contract.
pub const HELLO_DECK: &str = r#"<deck><canvas width="792" height="612"/><slide bg="white" fg="black"><text xp="50" yp="50" sp="3" align="center" color="black">Hello World</text></slide></deck>"#;

/// A deck exercising all nine supported shape kinds.
pub const SHAPES_DECK: &str = r#"<deck><canvas width="792" height="612"/>
<slide bg="white" fg="black">
    <image name="no-such-image.png" xp="20" yp="80" wp="10" hp="10"/>
    <rect xp="30" yp="70" wp="20" hp="10" color="steelblue" opacity="80"/>
    <ellipse xp="70" yp="70" wp="15" hp="15" color="orange"/>
    <line xp1="10" yp1="10" xp2="90" yp2="10" sp="0.3" color="gray"/>
    <arc xp="50" yp="50" wp="30" hp="30" a1="0" a2="180" sp="0.3"/>
    <curve xp1="10" yp1="30" xp2="50" yp2="60" xp3="90" yp3="30" sp="0.3" color="red"/>
    <polygon xc="45 55 50" yc="20 20 28" color="purple"/>
    <text xp="50" yp="90" sp="2.5" align="center">All shapes</text>
    <text xp="10" yp="40" sp="1.5" type="block" wp="30">block text that should wrap across lines</text>
    <text xp="10" yp="25" sp="1.2" type="code">let x = 1;
let y = 2;</text>
    <list xp="70" yp="45" sp="1.5" type="bullet">
        <li>alpha</li>
        <li>beta</li>
    </list>
</slide></deck>"#;

/// A pipeline with the passthrough compiler and an empty font library,
/// so measurements use the deterministic fallback metrics everywhere.
pub fn test_pipeline() -> Arc<Pipeline> {
    Arc::new(Pipeline::new(
        Arc::new(PassthroughCompiler),
        FontLibrary::new(),
    ))
}
