//! Solution descriptions for common test scenarios.

/// `App` (auto-linking executable) requiring `Mathx` (static library), both
/// with `Debug` and `Release`.
pub const APP_AND_MATHX: &str = r#"[solution]
name = "Demo"

[projects.App]
kind = "native-executable"
sources = ["main.cpp"]
requires = ["Mathx"]
link-dependencies = true

[[projects.App.configurations]]
name = "Debug"
include-paths = ["../Mathx"]
libraries = ["pthread"]
definitions = ["WIN32", "_DEBUG"]
compiler-flags = ["-g"]

[[projects.App.configurations]]
name = "Release"
include-paths = ["../Mathx"]
libraries = ["pthread"]
definitions = ["WIN32", "NDEBUG"]
compiler-flags = ["-O2"]

[projects.Mathx]
kind = "native-static-library"
sources = ["vector.cpp", "noise.c"]

[[projects.Mathx.configurations]]
name = "Debug"

[[projects.Mathx.configurations]]
name = "Release"
"#;

/// Managed `App` referencing the `Release` output of managed `Lib`, plus an
/// external assembly and the core runtime.
pub const MANAGED_LIB_AND_APP: &str = r#"[solution]
name = "Tools"

[projects.Lib]
kind = "managed-library"
sources = ["Lib.cs"]

[[projects.Lib.configurations]]
name = "Debug"
output-folder = "bin/Debug"
intermediate-folder = "obj/Debug"
debug = true
debug-info = "full"
constants = ["DEBUG", "TRACE"]

[[projects.Lib.configurations]]
name = "Release"
output-folder = "bin/Release"
intermediate-folder = "obj/Release"
optimize = true

[projects.App]
kind = "managed-executable"
sources = ["Program.cs", "Properties/AssemblyInfo.cs"]
requires = ["Lib"]
copy-to-output = ["app.config"]

[[projects.App.references]]
path = "../Lib/bin/Release/Lib.dll"
copy-local = true

[[projects.App.references]]
path = "../ThirdParty/Json.dll"
copy-local = true

[[projects.App.references]]
path = "/usr/lib/mono/4.5/mscorlib.dll"

[[projects.App.configurations]]
name = "Debug"
output-folder = "bin/Debug"
intermediate-folder = "obj/Debug"
debug = true

[[projects.App.configurations]]
name = "Release"
output-folder = "bin/Release"
intermediate-folder = "obj/Release"
optimize = true
warnings-as-errors = true
"#;

/// Override document removing `pthread` from every project.
pub const REMOVE_PTHREAD: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Overrides>
  <AllProjects>
    <RemoveLibrary library="pthread"/>
  </AllProjects>
</Overrides>
"#;
