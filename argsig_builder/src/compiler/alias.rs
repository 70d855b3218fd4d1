use std::collections::HashMap;

use crate::api::Short;
use crate::compiler::descriptor::Descriptor;
use crate::parser::ConfigError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const HELP: &str = "help";

/// Hands out short options for a single compilation.
///
/// Explicit requests are reserved first, across all descriptors.
/// Only then are the remaining proposals assigned, greedily in declaration order.
/// The order matters: the first declared argument wins a contested letter, and the loser simply goes without a short.
#[derive(Debug)]
pub(crate) struct ShortAllocator {
    reservations: HashMap<char, String>,
}

impl ShortAllocator {
    pub(crate) fn new(add_help: bool) -> Self {
        let mut reservations = HashMap::default();

        if add_help {
            reservations.insert('h', HELP.to_string());
        }

        Self { reservations }
    }

    pub(crate) fn reserve<'a>(
        &mut self,
        descriptors: impl IntoIterator<Item = &'a mut Descriptor>,
    ) -> Result<(), ConfigError> {
        for descriptor in descriptors {
            for alias in descriptor.aliases_mut() {
                if let Short::Explicit(short) = alias.request {
                    if !short.is_ascii_alphanumeric() {
                        return Err(ConfigError::InvalidShort {
                            short,
                            owner: alias.owner.clone(),
                        });
                    }

                    if let Some(first) = self.reservations.get(&short) {
                        return Err(ConfigError::DuplicateShort {
                            short,
                            first: first.clone(),
                            second: alias.owner.clone(),
                        });
                    }

                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Reserving '-{short}' for '{}'.", alias.owner);
                    }

                    self.reservations.insert(short, alias.owner.clone());
                    alias.assigned.replace(short);
                }
            }
        }

        Ok(())
    }

    pub(crate) fn assign<'a>(&mut self, descriptors: impl IntoIterator<Item = &'a mut Descriptor>) {
        for descriptor in descriptors {
            for alias in descriptor.aliases_mut() {
                if alias.request != Short::Auto || alias.assigned.is_some() {
                    continue;
                }

                if let Some(proposal) = alias.proposal {
                    if self.reservations.contains_key(&proposal) {
                        #[cfg(feature = "tracing_debug")]
                        {
                            debug!(
                                "Skipping '-{proposal}' for '{}', already taken by '{}'.",
                                alias.owner, self.reservations[&proposal]
                            );
                        }
                    } else {
                        #[cfg(feature = "tracing_debug")]
                        {
                            debug!("Assigning '-{proposal}' to '{}'.", alias.owner);
                        }

                        self.reservations.insert(proposal, alias.owner.clone());
                        alias.assigned.replace(proposal);
                    }
                }
            }
        }
    }
}
