//! 运行结果.

use std::io::{self, Write};
use std::time::Duration;

/// 单个输出文件的记录.
pub struct Entry {
    file: &'static str,
    shape: (usize, usize, usize),
    /// 掩码的前景体素数. 体数据为 `None`.
    foreground: Option<usize>,
    elapsed: Duration,
}

impl Entry {
    pub fn new(
        file: &'static str,
        shape: (usize, usize, usize),
        foreground: Option<usize>,
        elapsed: Duration,
    ) -> Self {
        Self {
            file,
            shape,
            foreground,
            elapsed,
        }
    }
}

/// 将 `e` 写进 `w` 中.
fn describe_into<W: Write>(e: &Entry, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Fixture `{}`:", e.file)?;
    writeln!(w, "{S4}Shape: {:?}", e.shape)?;
    match e.foreground {
        Some(n) => {
            let total = e.shape.0 * e.shape.1 * e.shape.2;
            let ratio = if total == 0 {
                0.0
            } else {
                n as f64 / total as f64
            };
            writeln!(w, "{S4}Foreground voxels: {n} ({:.4}%)", ratio * 100.0)?;
        }
        None => writeln!(w, "{S4}Foreground voxels: /")?,
    }
    write!(w, "{S4}Time: {} ms", e.elapsed.as_millis())?;
    Ok(())
}

/// 全部输出文件的记录.
#[derive(Default)]
pub struct Report {
    data: Vec<Entry>,
}

impl Report {
    pub fn push(&mut self, e: Entry) {
        self.data.push(e);
    }

    /// 打印运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(256);

        for e in self.data.iter() {
            buf.clear();
            if describe_into(e, &mut buf).is_ok() {
                println!("{}", String::from_utf8_lossy(&buf));
            }
            utils::sep();
        }
        let total: Duration = self.data.iter().map(|e| e.elapsed).sum();
        println!("{} fixtures written in {} ms", self.data.len(), total.as_millis());
    }
}
