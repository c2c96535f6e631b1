use super::{
    lines::{binding_comment, brace_delta, DeclLine},
    DefinitionTable, ExternalBinding, MethodSignature, NamespaceDefinition, TypeDefinition,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Type,
    Namespace,
}

/// Which list the most recently appended method lives in.
#[derive(Debug, Clone, Copy)]
enum MethodSlot {
    Instance(usize),
    Static(usize),
}

/// A `type` or `namespace` block whose closing brace has not been seen yet.
#[derive(Debug)]
struct BlockInProgress {
    kind: BlockKind,
    name: String,
    parent: Option<String>,
    /// Instance methods of a type, or every function of a namespace.
    methods: Vec<MethodSignature>,
    static_methods: Vec<MethodSignature>,
    /// Target of the next `// maps to:` comment in this block.
    last_method: Option<MethodSlot>,
    depth: i32,
}

impl BlockInProgress {
    fn new(kind: BlockKind, name: String, parent: Option<String>) -> BlockInProgress {
        BlockInProgress {
            kind,
            name,
            parent,
            methods: Vec::new(),
            static_methods: Vec::new(),
            last_method: None,
            depth: 1,
        }
    }

    fn push_static(&mut self, method: MethodSignature) {
        match self.kind {
            BlockKind::Type => {
                self.static_methods.push(method);
                self.last_method = Some(MethodSlot::Static(self.static_methods.len() - 1));
            }
            BlockKind::Namespace => self.push_function(method),
        }
    }

    fn push_instance(&mut self, method: MethodSignature) {
        match self.kind {
            BlockKind::Type => {
                self.methods.push(method);
                self.last_method = Some(MethodSlot::Instance(self.methods.len() - 1));
            }
            BlockKind::Namespace => self.push_function(method),
        }
    }

    fn push_function(&mut self, method: MethodSignature) {
        self.methods.push(MethodSignature {
            is_static: true,
            ..method
        });
        self.last_method = Some(MethodSlot::Instance(self.methods.len() - 1));
    }

    fn attach_binding(&mut self, binding: ExternalBinding) {
        let method = match self.last_method {
            Some(MethodSlot::Instance(index)) => self.methods.get_mut(index),
            Some(MethodSlot::Static(index)) => self.static_methods.get_mut(index),
            None => None,
        };

        match method {
            Some(method) => method.external_binding = Some(binding),
            None => tracing::trace!("Dropping binding {} with no preceding method", binding),
        }
    }
}

/// Single left-to-right pass over one declaration document.
pub(super) struct DocumentScanner<'t> {
    table: &'t mut DefinitionTable,
    source_id: &'t str,
    current: Option<BlockInProgress>,
}

impl<'t> DocumentScanner<'t> {
    pub(super) fn new(table: &'t mut DefinitionTable, source_id: &'t str) -> Self {
        DocumentScanner {
            table,
            source_id,
            current: None,
        }
    }

    pub(super) fn scan(mut self, text: &str) {
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            // Comments never open blocks or move the depth; inside a block
            // they can only carry a binding.
            if trimmed.starts_with("//") {
                if let (Some(block), Some(binding)) =
                    (self.current.as_mut(), binding_comment(trimmed))
                {
                    block.attach_binding(binding);
                }
                continue;
            }

            if let Some(opener) = DeclLine::opener(trimmed) {
                self.open(opener);
                continue;
            }

            self.feed(trimmed);
        }

        if let Some(block) = self.current {
            tracing::debug!(
                "Discarding unterminated block {} in {}",
                block.name,
                self.source_id
            );
        }
    }

    fn open(&mut self, opener: DeclLine) {
        let (block, rest) = match opener {
            DeclLine::TypeBlockStart { name, parent, rest } => {
                (BlockInProgress::new(BlockKind::Type, name, parent), rest)
            }
            DeclLine::NamespaceBlockStart { name, rest } => {
                (BlockInProgress::new(BlockKind::Namespace, name, None), rest)
            }
            _ => return,
        };

        if let Some(abandoned) = self.current.replace(block) {
            tracing::debug!(
                "Block {} in {} reopened before closing; discarding it",
                abandoned.name,
                self.source_id
            );
        }

        let rest = rest.trim();
        if !rest.is_empty() {
            self.feed(rest);
        }
    }

    fn feed(&mut self, trimmed: &str) {
        let Some(block) = self.current.as_mut() else {
            return;
        };

        block.depth += brace_delta(trimmed);

        match DeclLine::member(trimmed) {
            DeclLine::StaticMethod(method) => block.push_static(method),
            DeclLine::InstanceMethod(method) => block.push_instance(method),
            DeclLine::BindingComment(binding) => block.attach_binding(binding),
            _ => {}
        }

        if block.depth <= 0 {
            if let Some(block) = self.current.take() {
                self.finish(block);
            }
        }
    }

    fn finish(&mut self, block: BlockInProgress) {
        let source_id = self.source_id.to_string();
        match block.kind {
            BlockKind::Type => self.table.insert_type(TypeDefinition {
                name: block.name,
                parent: block.parent,
                instance_methods: block.methods,
                static_methods: block.static_methods,
                source_id,
            }),
            BlockKind::Namespace => self.table.insert_namespace(NamespaceDefinition {
                name: block.name,
                functions: block.methods,
                source_id,
            }),
        }
    }
}
