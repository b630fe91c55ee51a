/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `generate` — run outline generation then content ingestion end-to-end
- `outline`  — generate only the outline and print the plan
- `status`   — inspect the mirrored snapshot
- `publish`  — publish the mirrored course to the backend

These handlers are intentionally small and use the library components:
the outline client, the content ingestor, the slide store, and the
publisher.
*/

pub mod generate;
pub mod outline;
pub mod publish;
pub mod status;
