//! Packaging recipes
//!
//! Each recipe is a plan of steps relative to the working directory. Nothing
//! here touches the filesystem; the executor runs the plan later.

use super::archive::ArchiveTool;
use super::config::BuildConfig;
use super::target::Target;
use crate::core::plan::{Operation, OperationType, Plan};

/// Directory the embeddable distribution is unpacked into
const EMBED_DIR: &str = "python-embed";
/// Directory the pywin32 installer is unpacked into
const PYWIN32_DIR: &str = "pywin32";
/// CPython checkout
const SOURCE_DIR: &str = "cpython";

/// Builds package plans from one configuration
pub struct Recipes<'a> {
  config: &'a BuildConfig,
  archive: ArchiveTool,
  jobs: usize,
}

impl<'a> Recipes<'a> {
  /// Recipes using the archive tool and CPU count of this machine
  pub fn new(config: &'a BuildConfig) -> Self {
    Self {
      config,
      archive: ArchiveTool::detect(),
      jobs: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    }
  }

  #[cfg(test)]
  pub fn with_archive_tool(mut self, archive: ArchiveTool) -> Self {
    self.archive = archive;
    self
  }

  #[cfg(test)]
  pub fn with_jobs(mut self, jobs: usize) -> Self {
    self.jobs = jobs.max(1);
    self
  }

  /// File name of the archive a target produces
  pub fn artifact_name(&self, target: Target) -> String {
    match target {
      Target::WindowsAmd64 => format!("{}-embed-amd64+pywin32.zip", self.config.dist_name()),
      Target::WindowsWin32 => format!("{}-embed-win32+pywin32.zip", self.config.dist_name()),
      _ => format!("{}-{}.tar.gz", self.config.dist_name(), target),
    }
  }

  /// Full plan for one target
  pub fn plan(&self, target: Target) -> Plan {
    let artifact = self.artifact_name(target);
    let mut plan = Plan::new(OperationType::Package, Some(target.to_string()))
      .with_summary(format!(
        "   Python {} (revision {}) → {}",
        self.config.version,
        self.config.revision,
        self.config.upload_url(&artifact)
      ))
      .mark_destructive();

    match target {
      Target::WindowsAmd64 => plan.add_operations(self.windows_embed("amd64", &artifact)),
      Target::WindowsWin32 => plan.add_operations(self.windows_embed("win32", &artifact)),
      Target::Linux => plan.add_operations(self.source_build(None, &artifact)),
      Target::MacosX86_64 => plan.add_operations(self.source_build(Some(MacosSdk::X86_64), &artifact)),
      Target::MacosArm64 => plan.add_operations(self.source_build(Some(MacosSdk::Arm64), &artifact)),
    }

    plan
  }

  /// Repackage the embeddable zip with pywin32 in `lib/site-packages`
  ///
  /// The stock `._pth` file is removed so `site` processing works
  /// (https://bugs.python.org/issue34841).
  fn windows_embed(&self, arch: &str, artifact: &str) -> Vec<Operation> {
    let mm = self.config.major_minor();
    let pywin32_file = if arch == "amd64" {
      format!("pywin32-{}.win-amd64-py{}.exe", self.config.pywin32_version, mm)
    } else {
      format!("pywin32-{}.{}-py{}.exe", self.config.pywin32_version, arch, mm)
    };
    let embed_file = format!("python-{}-embed-{}.zip", self.config.version, arch);
    let pth = format!("{}/python{}._pth", EMBED_DIR, self.config.major_minor_compact());

    vec![
      Operation::Download {
        url: self.config.pywin32_url(&pywin32_file),
        dest: pywin32_file.clone(),
      },
      Operation::Download {
        url: self.config.python_url(&embed_file),
        dest: embed_file.clone(),
      },
      scratch_reset(EMBED_DIR),
      scratch_reset(PYWIN32_DIR),
      Operation::CreateDir {
        path: EMBED_DIR.to_string(),
      },
      self.archive.extract(&format!("../{}", embed_file)).in_dir(EMBED_DIR),
      Operation::RemoveFile {
        path: pth,
        ignore_missing: false,
      },
      Operation::CreateDir {
        path: PYWIN32_DIR.to_string(),
      },
      // The installer is a self-extracting zip; unzip warns about the stub and exits 1
      self
        .archive
        .extract(&format!("../{}", pywin32_file))
        .in_dir(PYWIN32_DIR)
        .accepting(&[0, 1]),
      Operation::Move {
        from: format!("{}/PLATLIB", PYWIN32_DIR),
        to: format!("{}/lib/site-packages", EMBED_DIR),
      },
      Operation::RemoveFile {
        path: artifact.to_string(),
        ignore_missing: true,
      },
      self.archive.compress(&format!("../{}", artifact)).in_dir(EMBED_DIR),
      Operation::RemoveDir {
        path: EMBED_DIR.to_string(),
        ignore_missing: false,
      },
      Operation::RemoveDir {
        path: PYWIN32_DIR.to_string(),
        ignore_missing: false,
      },
      Operation::Upload {
        file: artifact.to_string(),
        url: self.config.upload_url(artifact),
      },
    ]
  }

  /// Compile CPython, install into a staging root and tar the result
  fn source_build(&self, macos: Option<MacosSdk>, artifact: &str) -> Vec<Operation> {
    let mut ops = Vec::new();
    let mut env = Vec::new();
    let mut configure_args = Vec::new();

    if let Some(sdk) = macos {
      // Static openssl: drop the dylibs so the linker picks the archives
      ops.push(Operation::run("brew", ["install", "openssl", "pkg-config"]));
      for lib in ["libssl.dylib", "libcrypto.dylib"] {
        ops.push(Operation::RemoveFile {
          path: format!("{}/opt/openssl/lib/{}", sdk.prefix(), lib),
          ignore_missing: true,
        });
      }

      let min_version = format!("-mmacosx-version-min={}", sdk.min_version());
      let flags = format!("{} -Werror=partial-availability", min_version);
      env.push((
        "PKG_CONFIG_PATH".to_string(),
        format!("{}/opt/openssl/lib/pkgconfig", sdk.prefix()),
      ));
      env.push(("MACOSX_DEPLOYMENT_TARGET".to_string(), sdk.min_version().to_string()));
      configure_args.push(format!("CFLAGS={}", flags));
      configure_args.push(format!("CXXFLAGS={}", flags));
      configure_args.push(format!("LDFLAGS={}", min_version));
    }

    let dist = self.config.dist_name();
    let install_root = format!("{}/install/usr/local", SOURCE_DIR);

    ops.push(Operation::Clone {
      url: self.config.cpython_repo.clone(),
      path: SOURCE_DIR.to_string(),
    });
    ops.push(Operation::run("git", ["checkout".to_string(), format!("v{}", self.config.version)]).in_dir(SOURCE_DIR));
    ops.push(
      Operation::run("./configure", configure_args)
        .in_dir(SOURCE_DIR)
        .with_env(&env),
    );
    ops.push(
      Operation::run("make", ["-j".to_string(), self.jobs.to_string()])
        .in_dir(SOURCE_DIR)
        .with_env(&env),
    );
    ops.push(
      Operation::run("make", ["install", "DESTDIR=install"])
        .in_dir(SOURCE_DIR)
        .with_env(&env),
    );
    // requests pulls in certifi, without which the macOS build has no CA bundle
    ops.push(Operation::run(
      format!("{}/bin/python3", install_root),
      [format!("{}/bin/pip3", install_root), "install".to_string(), "requests".to_string()],
    ));
    ops.push(Operation::RemoveDir {
      path: dist.clone(),
      ignore_missing: true,
    });
    ops.push(Operation::Move {
      from: install_root,
      to: dist.clone(),
    });
    ops.push(Operation::RemoveDir {
      path: format!("{}/lib/python{}/test", dist, self.config.major_minor()),
      ignore_missing: false,
    });
    ops.push(Operation::RemoveDir {
      path: format!("{}/include", dist),
      ignore_missing: false,
    });
    ops.push(Operation::RemoveGlob {
      pattern: format!("{}/lib/lib*.a", dist),
    });
    ops.push(Operation::run("tar", ["zcvf", artifact, dist.as_str()]));
    ops.push(Operation::Upload {
      file: artifact.to_string(),
      url: self.config.upload_url(artifact),
    });

    ops
  }
}

/// Clear a scratch directory left by an earlier failed run
fn scratch_reset(path: &str) -> Operation {
  Operation::RemoveDir {
    path: path.to_string(),
    ignore_missing: true,
  }
}

#[derive(Debug, Clone, Copy)]
enum MacosSdk {
  X86_64,
  Arm64,
}

impl MacosSdk {
  /// Homebrew prefix
  fn prefix(self) -> &'static str {
    match self {
      MacosSdk::X86_64 => "/usr/local",
      MacosSdk::Arm64 => "/opt/homebrew",
    }
  }

  fn min_version(self) -> &'static str {
    match self {
      MacosSdk::X86_64 => "10.11",
      MacosSdk::Arm64 => "11.0",
    }
  }
}
