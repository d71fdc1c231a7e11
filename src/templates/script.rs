//! Client script for the inspection page.
//!
//! The page holds no inspection state of its own: it forwards user input to
//! the session socket and paints whatever `view` message comes back.

pub const SCRIPT: &str = r#"
const proto = location.protocol === 'https:' ? 'wss:' : 'ws:';
let socket = null;

function connect() {
    socket = new WebSocket(proto + '//' + location.host + '/ws');
    const status = document.getElementById('connection-status');
    socket.onopen = () => { status.textContent = 'connected'; };
    socket.onclose = () => {
        status.textContent = 'disconnected';
        setTimeout(connect, 2000);
    };
    socket.onmessage = (event) => {
        let msg;
        try { msg = JSON.parse(event.data); } catch (e) { return; }
        if (msg.type === 'view') paint(msg);
        if (msg.type === 'error') console.warn(msg.message);
    };
}

function send(command) {
    if (socket && socket.readyState === WebSocket.OPEN) {
        socket.send(JSON.stringify(command));
    }
}

function sendQuery(kind, value) {
    send({ type: kind === 'search' ? 'search' : 'citation_search', query: value });
}
function sendNav(direction, kind) { send({ type: direction, kind: kind }); }
function sendClear(kind) { send({ type: 'clear', kind: kind }); }
function sendActivate(number) { send({ type: 'activate', guideline: number }); }
function sendTab(tab) { send({ type: 'tab', tab: tab }); }

function syncInput(id, stream) {
    const input = document.getElementById(id + '-input');
    if (document.activeElement !== input && input.value !== stream.raw) {
        input.value = stream.raw;
    }
    document.getElementById(id + '-label').textContent = stream.label;
}

function findText(root, needle) {
    if (!needle) return null;
    const walker = document.createTreeWalker(root, NodeFilter.SHOW_TEXT);
    const wanted = needle.replace(/\s+/g, ' ').trim().toLowerCase();
    let node;
    while ((node = walker.nextNode())) {
        const text = node.textContent.replace(/\s+/g, ' ').toLowerCase();
        if (text.includes(wanted)) return node.parentElement;
    }
    return null;
}

function scrollTo(msg) {
    const note = document.getElementById('note');
    const target = msg.state.scroll;
    if (!target) return;
    let el = null;
    if (target.type === 'match') {
        el = note.querySelector('[data-' + target.kind + '-match-index="' + target.index + '"]');
    } else {
        el = findText(note, msg.scroll_text);
        if (el) {
            el.classList.add('scroll-flash');
            setTimeout(() => el.classList.remove('scroll-flash'), 1000);
        }
    }
    if (el) el.scrollIntoView({ behavior: 'smooth', block: 'center' });
}

function paint(msg) {
    const state = msg.state;
    if (msg.html !== undefined) document.getElementById('note').innerHTML = msg.html;
    if (msg.criteria !== undefined) document.getElementById('criteria').innerHTML = msg.criteria;
    document.querySelectorAll('.tab').forEach((b) => {
        b.classList.toggle('active', b.dataset.tab === state.tab);
    });
    document.body.classList.toggle('citations-active', state.active);
    syncInput('search', state.search);
    syncInput('citation-search', state.citation_search);
    scrollTo(msg);
}

connect();
"#;
