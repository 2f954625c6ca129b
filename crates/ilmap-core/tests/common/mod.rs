//! Fakes for the debuggee collaborators and symbol hosts.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ilmap_core::debuggee::{BinaryModule, DebuggeeThread, ILFrame, MemoryReader};
use ilmap_core::error::{IlmapError, IlmapResult};
use ilmap_core::symbols::{
    ChildVisitor, EvalOutcome, ImageLayout, ImageSource, ModuleSymbols, ParsedValue, SymbolHost, TableHost,
};
use ilmap_core::types::{Address, MethodToken, ProcessId, SequencePoint, ValueHandle};

pub const MVID: [u8; 16] = [
    0x8e, 0x90, 0x37, 0xd4, 0xe6, 0x65, 0x7c, 0x48, 0x97, 0x35, 0x7b, 0xdf, 0xf6, 0x99, 0xbe, 0xa5,
];

pub fn sp(offset: u32, line: u32, document: &str) -> SequencePoint
{
    SequencePoint {
        offset,
        start_line: line,
        end_line: line,
        start_column: 9,
        end_column: 30,
        document: document.to_string(),
    }
}

pub struct FakeModule
{
    pub name: String,
    pub base: Address,
    pub size: u32,
    pub pid: ProcessId,
    pub dynamic: bool,
    pub in_memory: bool,
    pub mvid: Option<[u8; 16]>,
    pub jmc: Mutex<Option<bool>>,
    pub method_jmc: Mutex<Vec<(MethodToken, bool)>>,
}

impl FakeModule
{
    pub fn new(name: &str, base: u64) -> Self
    {
        Self {
            name: name.to_string(),
            base: Address::new(base),
            size: 0x1000,
            pid: ProcessId(4242),
            dynamic: false,
            in_memory: false,
            mvid: Some(MVID),
            jmc: Mutex::new(None),
            method_jmc: Mutex::new(Vec::new()),
        }
    }

    pub fn dynamic(mut self) -> Self
    {
        self.dynamic = true;
        self
    }

    pub fn in_memory(mut self) -> Self
    {
        self.in_memory = true;
        self
    }

    pub fn broken_metadata(mut self) -> Self
    {
        self.mvid = None;
        self
    }

    pub fn jmc_status(&self) -> Option<bool>
    {
        *self.jmc.lock().unwrap()
    }

    pub fn method_jmc_calls(&self) -> Vec<(MethodToken, bool)>
    {
        self.method_jmc.lock().unwrap().clone()
    }
}

impl BinaryModule for FakeModule
{
    fn base_address(&self) -> IlmapResult<Address>
    {
        Ok(self.base)
    }

    fn size(&self) -> IlmapResult<u32>
    {
        Ok(self.size)
    }

    fn process_id(&self) -> IlmapResult<ProcessId>
    {
        Ok(self.pid)
    }

    fn is_dynamic(&self) -> IlmapResult<bool>
    {
        Ok(self.dynamic)
    }

    fn is_in_memory(&self) -> IlmapResult<bool>
    {
        Ok(self.in_memory)
    }

    fn module_version_id(&self) -> IlmapResult<[u8; 16]>
    {
        self.mvid
            .ok_or_else(|| IlmapError::MalformedMetadata("metadata scope unreadable".to_string()))
    }

    fn name(&self) -> IlmapResult<String>
    {
        Ok(self.name.clone())
    }

    fn set_jmc_status(&self, is_user_code: bool) -> IlmapResult<()>
    {
        *self.jmc.lock().unwrap() = Some(is_user_code);
        Ok(())
    }

    fn set_method_jmc_status(&self, method: MethodToken, is_user_code: bool) -> IlmapResult<()>
    {
        self.method_jmc.lock().unwrap().push((method, is_user_code));
        Ok(())
    }
}

pub struct FakeFrame
{
    pub module: Arc<dyn BinaryModule>,
    pub method: MethodToken,
    pub il_offset: u32,
    pub il_code_size: u32,
    pub locals: HashMap<u32, ValueHandle>,
}

impl FakeFrame
{
    pub fn new(module: Arc<dyn BinaryModule>, method: MethodToken, il_offset: u32, il_code_size: u32) -> Self
    {
        Self {
            module,
            method,
            il_offset,
            il_code_size,
            locals: HashMap::new(),
        }
    }

    pub fn with_local(mut self, slot: u32, value: ValueHandle) -> Self
    {
        self.locals.insert(slot, value);
        self
    }
}

impl ILFrame for FakeFrame
{
    fn function_token(&self) -> IlmapResult<MethodToken>
    {
        Ok(self.method)
    }

    fn module(&self) -> IlmapResult<Arc<dyn BinaryModule>>
    {
        Ok(Arc::clone(&self.module))
    }

    fn il_offset(&self) -> IlmapResult<u32>
    {
        Ok(self.il_offset)
    }

    fn il_code_size(&self) -> IlmapResult<u32>
    {
        Ok(self.il_code_size)
    }

    fn local_variable(&self, slot: u32) -> IlmapResult<Option<ValueHandle>>
    {
        Ok(self.locals.get(&slot).copied())
    }
}

pub struct FakeThread
{
    pub frame: Option<Arc<dyn ILFrame>>,
}

impl DebuggeeThread for FakeThread
{
    fn active_frame(&self) -> IlmapResult<Option<Arc<dyn ILFrame>>>
    {
        Ok(self.frame.clone())
    }
}

pub struct NullMemory;

impl MemoryReader for NullMemory
{
    fn read_memory(&self, _address: Address, _buffer: &mut [u8]) -> usize
    {
        0
    }
}

/// Debuggee memory holding one image at `base`.
pub struct ImageMemory
{
    pub base: Address,
    pub bytes: Vec<u8>,
}

impl MemoryReader for ImageMemory
{
    fn read_memory(&self, address: Address, buffer: &mut [u8]) -> usize
    {
        let Some(offset) = address.value().checked_sub(self.base.value()) else {
            return 0;
        };
        let Some(available) = usize::try_from(offset).ok().and_then(|offset| self.bytes.get(offset..)) else {
            return 0;
        };
        let count = available.len().min(buffer.len());
        buffer[..count].copy_from_slice(&available[..count]);
        count
    }
}

/// What a host was asked to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest
{
    File(String),
    InMemory
    {
        base: Address,
        size: u64,
        layout: ImageLayout,
        /// First two bytes of the image as read through the memory reader.
        header: Option<Vec<u8>>,
    },
}

/// A [`TableHost`] that counts preparations and records load requests.
pub struct RecordingHost
{
    pub inner: TableHost,
    pub prepares: Arc<AtomicUsize>,
    pub requests: Mutex<Vec<LoadRequest>>,
}

impl RecordingHost
{
    pub fn new(inner: TableHost) -> Self
    {
        Self {
            inner,
            prepares: Arc::new(AtomicUsize::new(0)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LoadRequest>
    {
        self.requests.lock().unwrap().clone()
    }
}

impl SymbolHost for RecordingHost
{
    fn prepare(&self) -> IlmapResult<()>
    {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_module_symbols(&self, source: &ImageSource) -> IlmapResult<Box<dyn ModuleSymbols>>
    {
        let request = match source {
            ImageSource::File { path } => LoadRequest::File(path.display().to_string()),
            ImageSource::InMemory { image, layout, reader } => LoadRequest::InMemory {
                base: image.start,
                size: image.size,
                layout: *layout,
                header: reader.as_ref().map(|reader| {
                    let mut header = [0u8; 2];
                    let read = reader.read_memory(image.start, &mut header);
                    header[..read].to_vec()
                }),
            },
        };
        self.requests.lock().unwrap().push(request);
        self.inner.load_module_symbols(source)
    }

    fn parse_expression(&self, expression: &str, type_name: &str) -> IlmapResult<ParsedValue>
    {
        self.inner.parse_expression(expression, type_name)
    }

    fn evaluate_expression(&self, expression: &str, children: &mut dyn ChildVisitor) -> IlmapResult<EvalOutcome>
    {
        self.inner.evaluate_expression(expression, children)
    }
}

/// A host whose preparation always fails.
#[derive(Default)]
pub struct BrokenHost
{
    pub prepares: AtomicUsize,
    pub loads: AtomicUsize,
}

impl SymbolHost for BrokenHost
{
    fn prepare(&self) -> IlmapResult<()>
    {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        Err(IlmapError::Provider("symbol reader library not found".to_string()))
    }

    fn load_module_symbols(&self, _source: &ImageSource) -> IlmapResult<Box<dyn ModuleSymbols>>
    {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Err(IlmapError::Provider("unreachable without preparation".to_string()))
    }
}
