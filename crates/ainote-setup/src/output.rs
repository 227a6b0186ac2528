use serde::Serialize;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Routes human-readable lines to stdout, or holds them back in `--json` mode.
pub struct Reporter {
    json: bool,
}

impl Reporter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn line(&self, text: impl AsRef<str>) {
        if !self.json {
            println!("{}", text.as_ref());
        }
    }

    pub fn blank(&self) {
        self.line("");
    }

    pub fn finish<T: Serialize>(&self, ok: bool, data: T) -> anyhow::Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&JsonOut { ok, data })?
            );
        }
        Ok(())
    }
}
